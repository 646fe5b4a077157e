//! Error types for the serial link

use std::io;
use thiserror::Error;

/// Errors that can occur while talking to the device over the serial link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// No complete line arrived within the read timeout
    #[error("Timed out waiting for the device")]
    Timeout,

    /// I/O error reported by the underlying stream
    #[error("Serial I/O error: {0}")]
    Io(String),

    /// The stream reached end-of-file
    #[error("Serial link closed")]
    Closed,
}

impl From<io::Error> for LinkError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => LinkError::Timeout,
            io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe => LinkError::Closed,
            _ => LinkError::Io(error.to_string()),
        }
    }
}
