//! Error type shared by every layer of the client.
//!
//! # Design
//! Parse-time and connect-time failures abort a call immediately. A timeout in
//! the middle of a session is not a transport fault: the read loop stops and
//! the bytes buffered so far travel inside `Error::Timeout`, so a caller can
//! tell a truncated response apart from a complete one and still inspect it.

use std::io;

/// Errors returned by URL parsing, the connection, and response decoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input could not be decomposed into scheme/host/port/path, or the
    /// scheme has no default port and none was given.
    #[error("malformed url: {0}")]
    MalformedUrl(String),

    /// Connecting to the peer failed (refused, unreachable, or timed out).
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// A send or receive failed for a reason other than a timeout.
    #[error("connection i/o failed: {0}")]
    Io(#[from] io::Error),

    /// A send or receive was attempted on a connection that is not open.
    #[error("connection is not open")]
    NotOpen,

    /// `open` was called on a connection that has already been used.
    #[error("connection was already used; open a new one")]
    Reused,

    /// The session hit the configured timeout before the peer closed.
    /// `received` holds whatever arrived before that.
    #[error("timed out after receiving {} bytes", received.len())]
    Timeout { received: Vec<u8> },

    /// The response bytes do not form a status line and header block.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Only GET and POST are supported.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The response body is not valid JSON (or not the requested shape).
    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
