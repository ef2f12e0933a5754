//! Byte-level transport layer for the FX programming-port protocol.
//!
//! A [`Transport`] is a byte pipe: `write`, `read`, `close`. Two concrete
//! implementations are provided — [`SerialTransport`] for a direct RS-232
//! link and [`TcpTransport`] for a serial-to-TCP bridge. Neither
//! implementation understands framing; that is [`fxplc-core`]'s job.

mod error;
mod serial;
mod tcp;

pub use error::{Result, TransportError};
pub use serial::{SerialConfig, SerialTransport};
pub use tcp::{TcpConfig, TcpTransport};

/// Default per-transport read deadline.
pub const DEFAULT_READ_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);

/// A byte pipe to a PLC link.
///
/// `read` may return fewer bytes than `max_size` but never zero unless the
/// link has reached end-of-stream; in that case it returns
/// [`TransportError::ConnectionClosed`] rather than an empty buffer, so
/// callers never have to special-case a zero-length success.
pub trait Transport: Send {
    /// Write `bytes` to the link. Fire-and-forget: errors on the wire
    /// surface on the next `read`, not here.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read up to `max_size` bytes, blocking until at least one byte
    /// arrives or the transport's read deadline elapses.
    fn read(&mut self, max_size: usize) -> Result<Vec<u8>>;

    /// Close the underlying link. Idempotent.
    fn close(&mut self) -> Result<()>;
}
