//! Absolute URL parsing with a fixed default-port policy.
//!
//! # Design
//! The `url` crate validates the input and supplies scheme, host and port.
//! Path, query and fragment are cut from the input text as written: the WHATWG
//! parser would resolve dot segments and percent-encode, and the request line
//! must carry what the caller wrote.
//!
//! `port` is always populated. A port written in the authority is kept even
//! when it equals a scheme default (the `url` crate hides those). Otherwise it
//! is looked up in `DEFAULT_PORTS`; a scheme missing from that table is an
//! error rather than a sentinel port.

use std::fmt;
use std::str::FromStr;

use url::Host;

use crate::error::{Error, Result};

/// Scheme → port used when the input does not name one.
pub const DEFAULT_PORTS: &[(&str, u16)] = &[("http", 80), ("https", 443)];

/// Default port for `scheme`, if the scheme is known.
pub fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(scheme))
        .map(|(_, port)| *port)
}

/// A parsed absolute URL. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    scheme: String,
    host: String,
    port: u16,
    path: String,
    query: String,
    fragment: String,
}

impl Url {
    /// Parse `raw` as `scheme://host[:port][/path][?query][#fragment]`.
    pub fn parse(raw: &str) -> Result<Self> {
        let parsed = url::Url::parse(raw).map_err(|e| Error::MalformedUrl(format!("{raw}: {e}")))?;

        let scheme = parsed.scheme().to_ascii_lowercase();

        let host = match parsed.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(Error::MalformedUrl(format!("{raw}: missing host"))),
        };

        let parts = RawParts::split(raw)
            .ok_or_else(|| Error::MalformedUrl(format!("{raw}: expected scheme://host")))?;
        let port = if parts.has_explicit_port() {
            parsed.port_or_known_default()
        } else {
            default_port(&scheme)
        };
        let port = match port {
            Some(port) => port,
            None => {
                return Err(Error::MalformedUrl(format!(
                    "{raw}: no port given and no default for scheme {scheme:?}"
                )))
            }
        };

        Ok(Self {
            scheme,
            host,
            port,
            path: parts.path.to_string(),
            query: parts.query.to_string(),
            fragment: parts.fragment.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The `(host, port)` pair a connection is opened to.
    pub fn address(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

/// The input split on its delimiters, with no decoding or normalization.
#[derive(Debug, PartialEq, Eq)]
struct RawParts<'a> {
    authority: &'a str,
    path: &'a str,
    query: &'a str,
    fragment: &'a str,
}

impl<'a> RawParts<'a> {
    /// `None` unless the input has the `scheme://authority` shape.
    fn split(raw: &'a str) -> Option<Self> {
        let raw = raw.trim_matches(|c: char| c <= ' ');
        let (_, after_scheme) = raw.split_once(':')?;
        let hier = after_scheme.strip_prefix("//")?;
        let end = hier.find(['/', '?', '#']).unwrap_or(hier.len());
        let (authority, rest) = hier.split_at(end);

        let (rest, fragment) = rest.split_once('#').unwrap_or((rest, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Some(Self {
            authority,
            path,
            query,
            fragment,
        })
    }

    /// `true` when the authority ends in `:<digits>`, IPv6 brackets aside.
    fn has_explicit_port(&self) -> bool {
        let host_port = self.authority.rsplit_once('@').map_or(self.authority, |(_, hp)| hp);
        let after_host = match host_port.rfind(']') {
            Some(close) => &host_port[close + 1..],
            None => host_port,
        };
        after_host
            .rsplit_once(':')
            .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl FromStr for Url {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Url::parse(s)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}{}", self.scheme, self.host, self.port, self.path)?;
        } else {
            write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)?;
        }
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}
