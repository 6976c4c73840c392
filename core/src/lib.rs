//! Minimal blocking HTTP/1.1 client.
//!
//! # Overview
//! Parses a URL, serializes a GET or POST request byte-for-byte, sends it over
//! a fresh TCP connection, reads until the peer closes, and parses the result
//! into status, headers, and body.
//!
//! # Design
//! - `Client` is stateless; every call owns exactly one `Connection`.
//! - Framing is close-delimited: no keep-alive, no `Content-Length` or chunked
//!   reads, no TLS. The request line still says `HTTP/1.1`.
//! - Timeouts end a session gracefully and surface as `Error::Timeout` with
//!   the partial bytes, so a truncated body is never mistaken for success.
//! - Response header lines that do not decode are dropped, not fatal.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod request;
pub mod response;
pub mod url;

pub use client::{get, request, Client};
pub use config::ClientConfig;
pub use connection::{ChunkRead, Connection, SendOutcome, Session};
pub use error::{Error, Result};
pub use request::{Method, Request, HTTP_VERSION};
pub use response::Response;
pub use crate::url::Url;
