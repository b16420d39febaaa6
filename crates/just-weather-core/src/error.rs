//! Error types for network and cache operations

use std::io;
use thiserror::Error;

/// Main error type for transport, HTTP and cache operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad input from the caller; never retried
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Connect or receive exceeded its bound
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// DNS or connect failure after exhausting every candidate address
    #[error("connection error: {0}")]
    Connection(String),

    /// Send, receive or disk failure in the middle of an operation
    #[error("I/O error: {0}")]
    Io(String),

    /// Malformed status line, header or chunk framing from the peer
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Fieldless classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Timeout,
    Connection,
    Io,
    Protocol,
}

impl ErrorKind {
    /// Get kind as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Connection => "connection",
            ErrorKind::Io => "io",
            ErrorKind::Protocol => "protocol",
        }
    }
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Error::Timeout(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Error::Connection(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Wrap an `io::Error` with context, keeping timeouts distinguishable
    pub fn from_io(context: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Error::Timeout(format!("{context}: {err}"))
            }
            _ => Error::Io(format!("{context}: {err}")),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Connection(_) => ErrorKind::Connection,
            Error::Io(_) => ErrorKind::Io,
            Error::Protocol(_) => ErrorKind::Protocol,
        }
    }

    /// Whether retrying the whole request (with backoff) may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Connection(_))
    }

    /// The human-readable description without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Error::InvalidArgument(msg)
            | Error::Timeout(msg)
            | Error::Connection(msg)
            | Error::Io(msg)
            | Error::Protocol(msg) => msg,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from_io("i/o failure", err)
    }
}

/// Result type alias for network and cache operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("host must not be empty");
        assert_eq!(err.to_string(), "invalid argument: host must not be empty");

        let err = Error::protocol("malformed chunk size");
        assert_eq!(err.to_string(), "protocol error: malformed chunk size");
        assert_eq!(err.message(), "malformed chunk size");
    }

    #[test]
    fn test_kind_and_retry() {
        assert_eq!(Error::timeout("x").kind(), ErrorKind::Timeout);
        assert!(Error::timeout("x").is_retryable());
        assert!(Error::connection("x").is_retryable());
        assert!(!Error::io("x").is_retryable());
        assert!(!Error::protocol("x").is_retryable());
        assert!(!Error::invalid_argument("x").is_retryable());
        assert_eq!(ErrorKind::Io.as_str(), "io");
    }

    #[test]
    fn test_from_io_maps_timeouts() {
        let err = Error::from_io("receive", io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let err: Error = io::Error::from(io::ErrorKind::BrokenPipe).into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
