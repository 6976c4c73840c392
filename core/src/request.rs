//! Request model and its wire serialization.
//!
//! # Design
//! A `Request` is plain data serialized exactly once to the byte sequence sent
//! on the socket:
//!
//! ```text
//! <METHOD> <path> HTTP/1.1\r\n
//! Host: <host>\r\n
//! <name>: <value>\r\n ...
//! \r\n
//! <body>
//! ```
//!
//! Headers are written in the order given. Nothing is added automatically
//! beyond the single `Host` line: no `Content-Length`, no `Connection`. A
//! caller-supplied `Host` header is emitted as a second line, not merged.
//! The query and fragment of the URL are not part of the request target.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::url::Url;

/// Protocol label written on the request line. Framing is still
/// close-delimited regardless of what this says.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// The supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Method::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(Method::Post)
        } else {
            Err(Error::UnsupportedMethod(s.to_string()))
        }
    }
}

/// A single request, built per call and not reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url, headers: Vec<(String, String)>, body: Option<Vec<u8>>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Path written on the request line. An empty path becomes `/`.
    pub fn target(&self) -> &str {
        match self.url.path() {
            "" => "/",
            path => path,
        }
    }

    /// The exact bytes to put on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut lines = Vec::with_capacity(self.headers.len() + 2);
        lines.push(format!("{} {} {HTTP_VERSION}", self.method, self.target()));
        lines.push(format!("Host: {}", self.url.host()));
        lines.extend(self.headers.iter().map(|(name, value)| format!("{name}: {value}")));

        let mut out = lines.join("\r\n").into_bytes();
        out.extend_from_slice(b"\r\n\r\n");
        if let Some(body) = &self.body {
            out.extend_from_slice(body);
        }
        out
    }
}
