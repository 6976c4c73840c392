//! Per-client settings.
//!
//! There are no config files or environment variables: a `ClientConfig` is
//! built in code and handed to `Client::with_config`.

use std::time::Duration;

/// Bytes requested from the socket per receive call.
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Settings applied to every connection a `Client` opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bounds connect, each send, and each receive individually. `None`
    /// blocks indefinitely.
    pub timeout: Option<Duration>,
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// A zero chunk size is bumped to one byte so a read can still make progress.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}
