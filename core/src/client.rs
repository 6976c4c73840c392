//! One-shot HTTP client over a fresh connection per call.
//!
//! # Design
//! `Client` holds only its `ClientConfig` and carries no mutable state between
//! calls. Each call parses the URL, builds a `Request`, opens a new
//! `Connection` to the URL's host and port, runs exactly one session, and
//! parses whatever came back. Nothing is pooled.
//!
//! Because the response ends when the peer closes the socket, talking to a
//! keep-alive server requires the caller to send `Connection: close`.

use log::debug;

use crate::config::ClientConfig;
use crate::connection::{Connection, Session};
use crate::error::{Error, Result};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::url::Url;

/// Stateless client; cheap to clone and safe to share between threads since
/// every call owns its own connection.
#[derive(Debug, Clone, Default)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request and parse the response.
    ///
    /// A session that ended on a timeout is returned as `Error::Timeout`
    /// carrying the partial bytes, never as a truncated `Response`.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&[u8]>,
    ) -> Result<Response> {
        let url = Url::parse(url)?;
        let headers = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let request = Request::new(method, url, headers, body.map(<[u8]>::to_vec));

        let (host, port) = request.url().address();
        let mut connection = Connection::with_config(host, port, &self.config);
        debug!("{} {}", request.method(), request.url());

        match connection.run_session(Some(&request.to_bytes()))? {
            Session::Complete(raw) => Response::from_bytes(&raw),
            Session::TimedOut(received) => Err(Error::Timeout { received }),
        }
    }

    pub fn get(&self, url: &str, headers: &[(&str, &str)], body: Option<&[u8]>) -> Result<Response> {
        self.request(Method::Get, url, headers, body)
    }

    pub fn post(&self, url: &str, headers: &[(&str, &str)], body: Option<&[u8]>) -> Result<Response> {
        self.request(Method::Post, url, headers, body)
    }
}

/// `Client::request` with the default configuration.
pub fn request(method: Method, url: &str, headers: &[(&str, &str)], body: Option<&[u8]>) -> Result<Response> {
    Client::new().request(method, url, headers, body)
}

/// `Client::get` with the default configuration.
pub fn get(url: &str, headers: &[(&str, &str)], body: Option<&[u8]>) -> Result<Response> {
    Client::new().get(url, headers, body)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn malformed_url_fails_before_connecting() {
        let err = Client::new().get("not a url", &[], None).unwrap_err();
        assert!(matches!(err, Error::MalformedUrl(_)));
    }

    #[test]
    fn unknown_scheme_without_port_fails() {
        let err = get("gopher://example.com/", &[], None).unwrap_err();
        assert!(matches!(err, Error::MalformedUrl(_)));
    }

    #[test]
    fn refused_connection_is_connect_error() {
        // Bind then drop to get a local port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = Client::with_config(ClientConfig::default().with_timeout(Duration::from_secs(2)));
        let err = client.get(&format!("http://127.0.0.1:{port}/"), &[], None).unwrap_err();
        assert!(matches!(err, Error::Connect { port: p, .. } if p == port));
    }

    #[test]
    fn config_is_kept() {
        let config = ClientConfig::default().with_chunk_size(512);
        assert_eq!(Client::with_config(config.clone()).config(), &config);
    }
}
