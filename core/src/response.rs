//! Response parsing from the raw bytes of a close-delimited session.
//!
//! # Design
//! The raw bytes are split at the first `\r\n\r\n`. Everything after it is the
//! body, untouched: there is no `Content-Length` or chunked decoding, since
//! the peer closing the connection is what ended the message.
//!
//! The status line must decode and carry at least a version and an integer
//! code. Header lines are forgiving: a line with no `:` or with bytes that are
//! not UTF-8 is dropped and the parse continues. A repeated header name keeps
//! its last value.

use std::collections::HashMap;

use log::trace;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

const HEADER_END: &[u8] = b"\r\n\r\n";

/// A parsed response. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    version: String,
    status_code: u16,
    reason: String,
    headers: HashMap<String, String>,
    content: Vec<u8>,
}

impl Response {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let header_end = find_subslice(raw, HEADER_END)
            .ok_or_else(|| Error::MalformedResponse("no header/body separator".to_string()))?;

        let header_block = &raw[..header_end];
        let content = raw[header_end + HEADER_END.len()..].to_vec();

        if header_block.is_empty() {
            return Err(Error::MalformedResponse("missing status line".to_string()));
        }

        let mut lines = split_crlf(header_block);
        let status_line = lines.next().unwrap_or_default();
        let (version, status_code, reason) = parse_status_line(status_line)?;

        let mut headers = HashMap::new();
        for line in lines {
            let Some(colon) = line.iter().position(|b| *b == b':') else {
                trace!("skipping header line without colon: {:?}", String::from_utf8_lossy(line));
                continue;
            };
            let (Ok(name), Ok(value)) = (
                std::str::from_utf8(&line[..colon]),
                std::str::from_utf8(&line[colon + 1..]),
            ) else {
                trace!("skipping undecodable header line: {:?}", String::from_utf8_lossy(line));
                continue;
            };
            headers.insert(name.trim().to_string(), value.trim().to_string());
        }

        Ok(Self {
            version,
            status_code,
            reason,
            headers,
            content,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Exact-name lookup, matching how the headers were stored.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// `true` for 2xx and 3xx.
    pub fn is_ok(&self) -> bool {
        (200..400).contains(&self.status_code)
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.content)
            .map_err(|e| Error::MalformedResponse(format!("body is not utf-8: {e}")))
    }

    /// Decode the body as JSON. Use `serde_json::Value` for untyped access.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.content)?)
    }
}

fn parse_status_line(line: &[u8]) -> Result<(String, u16, String)> {
    let line = std::str::from_utf8(line)
        .map_err(|e| Error::MalformedResponse(format!("status line is not utf-8: {e}")))?;

    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    let Some(code) = parts.next() else {
        return Err(Error::MalformedResponse(format!("invalid status line: {line:?}")));
    };
    let reason = parts.next().unwrap_or_default();

    let status_code = code
        .parse::<u16>()
        .map_err(|_| Error::MalformedResponse(format!("status code is not an integer: {code:?}")))?;

    Ok((version.to_string(), status_code, reason.to_string()))
}

fn split_crlf(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(block);
    std::iter::from_fn(move || {
        let current = rest?;
        match find_subslice(current, b"\r\n") {
            Some(pos) => {
                rest = Some(&current[pos + 2..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_headers_and_body() {
        let res = Response::from_bytes(b"HTTP/1.1 200 OK\r\nX: y\r\n\r\nhello").unwrap();
        assert_eq!(res.version(), "HTTP/1.1");
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.reason(), "OK");
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.header("X"), Some("y"));
        assert_eq!(res.content(), b"hello");
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = Response::from_bytes(b"HTTP/1.1 200 OK\r\nX: y\r\n").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn empty_header_block_is_malformed() {
        let err = Response::from_bytes(b"\r\n\r\nbody").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(m) if m.contains("status line")));
    }

    #[test]
    fn status_line_without_code_is_malformed() {
        let err = Response::from_bytes(b"HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn non_numeric_code_is_malformed() {
        let err = Response::from_bytes(b"HTTP/1.1 abc OK\r\n\r\n").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(m) if m.contains("abc")));
    }

    #[test]
    fn undecodable_status_line_is_malformed() {
        let err = Response::from_bytes(b"HTTP/1.1 200 \xff\xfe\r\n\r\n").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn reason_defaults_to_empty() {
        let res = Response::from_bytes(b"HTTP/1.1 204\r\n\r\n").unwrap();
        assert_eq!(res.status_code(), 204);
        assert_eq!(res.reason(), "");
        assert!(res.content().is_empty());
    }

    #[test]
    fn reason_keeps_inner_spaces() {
        let res = Response::from_bytes(b"HTTP/1.1 404 Not Found\r\n\r\n").unwrap();
        assert_eq!(res.reason(), "Not Found");
    }

    #[test]
    fn undecodable_header_is_dropped() {
        let raw = b"HTTP/1.1 200 OK\r\nBad: \xff\xfe\r\nGood: yes\r\n\r\n";
        let res = Response::from_bytes(raw).unwrap();
        assert_eq!(res.header("Bad"), None);
        assert_eq!(res.header("Good"), Some("yes"));
    }

    #[test]
    fn header_without_colon_is_skipped() {
        let raw = b"HTTP/1.1 200 OK\r\nnot a header\r\nA:  spaced  \r\n\r\n";
        let res = Response::from_bytes(raw).unwrap();
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.header("A"), Some("spaced"));
    }

    #[test]
    fn value_keeps_later_colons() {
        let raw = b"HTTP/1.1 302 Found\r\nLocation: http://example.com:8080/x\r\n\r\n";
        let res = Response::from_bytes(raw).unwrap();
        assert_eq!(res.header("Location"), Some("http://example.com:8080/x"));
    }

    #[test]
    fn last_duplicate_header_wins() {
        let raw = b"HTTP/1.1 200 OK\r\nX: first\r\nX: second\r\n\r\n";
        let res = Response::from_bytes(raw).unwrap();
        assert_eq!(res.header("X"), Some("second"));
    }

    #[test]
    fn body_is_everything_after_first_separator() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\nNot: a header\r\n\r\ntail";
        let res = Response::from_bytes(raw).unwrap();
        assert!(res.headers().is_empty());
        assert_eq!(res.content(), b"Not: a header\r\n\r\ntail");
    }

    #[test]
    fn ok_boundaries() {
        let ok = |code: u16| {
            let raw = format!("HTTP/1.1 {code} X\r\n\r\n");
            Response::from_bytes(raw.as_bytes()).unwrap().is_ok()
        };
        assert!(!ok(199));
        assert!(ok(200));
        assert!(ok(399));
        assert!(!ok(400));
    }

    #[test]
    fn json_body() {
        let res = Response::from_bytes(b"HTTP/1.1 200 OK\r\n\r\n{\"a\":[1,2]}").unwrap();
        let value: serde_json::Value = res.json().unwrap();
        assert_eq!(value["a"][1], 2);
    }

    #[test]
    fn json_body_invalid() {
        let res = Response::from_bytes(b"HTTP/1.1 200 OK\r\n\r\nnot json").unwrap();
        let err = res.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn text_rejects_invalid_utf8() {
        let res = Response::from_bytes(b"HTTP/1.1 200 OK\r\n\r\n\xff").unwrap();
        assert!(res.text().is_err());
        let res = Response::from_bytes(b"HTTP/1.1 200 OK\r\n\r\nhi").unwrap();
        assert_eq!(res.text().unwrap(), "hi");
    }
}
