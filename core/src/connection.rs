//! Blocking TCP session: open, send once, read until the peer closes, close.
//!
//! # Design
//! A `Connection` owns at most one socket and moves `Closed → Open → Closed`
//! exactly once; it is never pooled or reopened for a second request.
//!
//! End of response is signalled only by the peer closing the connection (a
//! zero-length read). That is correct for servers that do not keep the
//! connection alive, which is the accepted limitation of this client.
//!
//! A configured timeout is not a fault here. When it fires during a send or a
//! receive the socket is force-closed and the outcome says so, leaving the
//! bytes received so far in the buffer for the caller to judge.
//!
//! All operations take `&mut self`, so a single `Connection` cannot be driven
//! from two threads at once.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Result of one bounded read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRead {
    /// `n` bytes were appended to the buffer; keep reading.
    Data(usize),
    /// The peer closed the connection; the buffer is complete.
    PeerClosed,
    /// The read timed out and the connection was force-closed.
    TimedOut,
}

/// Result of writing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The write timed out and the connection was force-closed.
    TimedOut,
}

/// How a full session ended, with everything received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Complete(Vec<u8>),
    TimedOut(Vec<u8>),
}

impl Session {
    pub fn is_complete(&self) -> bool {
        matches!(self, Session::Complete(_))
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Session::Complete(bytes) | Session::TimedOut(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Session::Complete(bytes) | Session::TimedOut(bytes) => bytes,
        }
    }
}

#[derive(Debug)]
pub struct Connection {
    host: String,
    port: u16,
    timeout: Option<Duration>,
    chunk_size: usize,
    stream: Option<TcpStream>,
    opened: bool,
    sent: Vec<u8>,
    buffer: Vec<u8>,
}

impl Connection {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_config(host, port, &ClientConfig::default())
    }

    pub fn with_config(host: &str, port: u16, config: &ClientConfig) -> Self {
        Self {
            host: host.to_string(),
            port,
            // A zero duration is rejected by the socket timeout setters.
            timeout: config.timeout.filter(|t| !t.is_zero()),
            chunk_size: config.chunk_size.max(1),
            stream: None,
            opened: false,
            sent: Vec::new(),
            buffer: Vec::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Bytes received so far.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The content last written in full by `send`.
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Resolve the host and connect, trying each resolved address in turn.
    /// Opening an already open connection does nothing; opening one that has
    /// been open before fails with `Error::Reused`.
    pub fn open(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        if self.opened {
            return Err(Error::Reused);
        }

        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| self.connect_error(source))?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = match self.timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    stream
                        .set_read_timeout(self.timeout)
                        .and_then(|_| stream.set_write_timeout(self.timeout))
                        .map_err(|source| self.connect_error(source))?;
                    debug!("connected to {}:{} via {addr}", self.host, self.port);
                    self.stream = Some(stream);
                    self.opened = true;
                    return Ok(());
                }
                Err(e) => {
                    trace!("connect to {addr} failed: {e}");
                    last_err = Some(e);
                }
            }
        }

        let source = last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses"));
        Err(self.connect_error(source))
    }

    /// Write all of `content`. A timeout closes the connection and is
    /// reported as `SendOutcome::TimedOut` rather than an error.
    pub fn send(&mut self, content: &[u8]) -> Result<SendOutcome> {
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;
        let written = stream.write_all(content).and_then(|_| stream.flush());

        match written {
            Ok(()) => {
                self.sent = content.to_vec();
                trace!("sent {} bytes to {}:{}", content.len(), self.host, self.port);
                Ok(SendOutcome::Sent)
            }
            Err(e) if is_timeout(&e) => {
                debug!("send to {}:{} timed out", self.host, self.port);
                self.close();
                Ok(SendOutcome::TimedOut)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Read at most one chunk and append it to the buffer.
    pub fn receive_chunk(&mut self) -> Result<ChunkRead> {
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;
        let mut chunk = vec![0u8; self.chunk_size];

        let read = loop {
            match stream.read(&mut chunk) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match read {
            Ok(0) => {
                trace!("peer {}:{} closed after {} bytes", self.host, self.port, self.buffer.len());
                Ok(ChunkRead::PeerClosed)
            }
            Ok(n) => {
                self.buffer.extend_from_slice(&chunk[..n]);
                trace!("received {n} bytes from {}:{}", self.host, self.port);
                Ok(ChunkRead::Data(n))
            }
            Err(e) if is_timeout(&e) => {
                debug!(
                    "receive from {}:{} timed out with {} bytes buffered",
                    self.host,
                    self.port,
                    self.buffer.len()
                );
                self.close();
                Ok(ChunkRead::TimedOut)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Release the socket. Safe to call any number of times; shutdown errors
    /// are ignored and the connection always ends up closed.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                trace!("ignoring shutdown error for {}:{}: {e}", self.host, self.port);
            }
            debug!("closed connection to {}:{}", self.host, self.port);
        }
    }

    /// Open, optionally send `content`, read until the peer closes or a
    /// timeout fires, then close. The connection is closed on every path,
    /// including errors.
    pub fn run_session(&mut self, content: Option<&[u8]>) -> Result<Session> {
        self.open()?;
        let session = self.exchange(content);
        self.close();
        session
    }

    fn exchange(&mut self, content: Option<&[u8]>) -> Result<Session> {
        if let Some(content) = content {
            if self.send(content)? == SendOutcome::TimedOut {
                return Ok(Session::TimedOut(std::mem::take(&mut self.buffer)));
            }
        }

        loop {
            match self.receive_chunk()? {
                ChunkRead::Data(_) => continue,
                ChunkRead::PeerClosed => return Ok(Session::Complete(std::mem::take(&mut self.buffer))),
                ChunkRead::TimedOut => return Ok(Session::TimedOut(std::mem::take(&mut self.buffer))),
            }
        }
    }

    fn connect_error(&self, source: io::Error) -> Error {
        Error::Connect {
            host: self.host.clone(),
            port: self.port,
            source,
        }
    }
}

/// Socket timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
