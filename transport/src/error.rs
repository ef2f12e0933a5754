//! Transport-level errors.

use std::io;

/// Transport I/O error.
///
/// Only three kinds are ever observable outside this crate — every other
/// `std::io::Error` a concrete transport can produce is folded into
/// [`TransportError::ConnectionClosed`] by [`map_io_error`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No byte arrived within the configured read deadline.
    #[error("transport read timed out")]
    Timeout,
    /// An operation was attempted before the transport was connected.
    #[error("transport is not connected")]
    NotConnected,
    /// The underlying link is gone (EOF, reset, or an unclassified I/O error).
    #[error("transport connection closed")]
    ConnectionClosed,
}

/// Map a raw `io::Error` onto the crate's closed error set.
pub(crate) fn map_io_error(err: &io::Error) -> TransportError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
        io::ErrorKind::NotConnected => TransportError::NotConnected,
        _ => TransportError::ConnectionClosed,
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
