//! The raw link handle handed to an external tunnel while the broker is
//! paused for it.

use fxplc_transport::{Result as TransportResult, Transport};

/// A thin wrapper exposing only `read`/`write`/`close` — not the full
/// `PlcClient` surface — so a tunnel can pass bytes through the link but
/// can never issue a framed PLC command while it holds the handle.
pub struct TransportHandle {
    inner: Box<dyn Transport>,
}

impl TransportHandle {
    pub(crate) fn new(inner: Box<dyn Transport>) -> Self {
        Self { inner }
    }

    pub fn write(&mut self, bytes: &[u8]) -> TransportResult<()> {
        self.inner.write(bytes)
    }

    pub fn read(&mut self, max_size: usize) -> TransportResult<Vec<u8>> {
        self.inner.read(max_size)
    }

    /// Close the link. The broker opens a fresh transport on `resume()`
    /// regardless, so this just releases the physical resource promptly
    /// instead of waiting for `Drop`.
    pub fn close(mut self) -> TransportResult<()> {
        self.inner.close()
    }
}
