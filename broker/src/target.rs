//! Selecting a transport from a single configuration path string.
//!
//! A path of the form `tcp:<host>:<port>` selects the TCP bridge
//! transport; any other string is a serial device path. Grounded in the
//! original implementation's `serial_task_loop`, which does the same
//! `path.startswith("tcp:")` dispatch.

use fxplc_transport::{SerialConfig, TcpConfig};

/// Which concrete transport to open, and with what parameters.
#[derive(Debug, Clone)]
pub enum TransportTarget {
    Serial(SerialConfig),
    Tcp(TcpConfig),
    /// No physical link; the worker builds a [`fxplc_core::MockClient`]
    /// instead of a real [`fxplc_core::Client`]. For demo/offline use —
    /// selected explicitly by the caller, never by [`TransportTarget::parse`].
    #[cfg(feature = "mock")]
    Mock,
}

/// Error parsing a `tcp:<host>:<port>` target string.
#[derive(Debug, thiserror::Error)]
#[error("invalid transport target: {0}")]
pub struct TargetParseError(String);

impl TransportTarget {
    /// Parse a `tcp:<host>:<port>`-or-bare-path target string.
    pub fn parse(path: &str) -> Result<Self, TargetParseError> {
        match path.strip_prefix("tcp:") {
            Some(rest) => {
                let (host, port) = rest
                    .rsplit_once(':')
                    .ok_or_else(|| TargetParseError(format!("missing port in {path:?}")))?;
                let port: u16 = port
                    .parse()
                    .map_err(|_| TargetParseError(format!("invalid port in {path:?}")))?;
                Ok(Self::Tcp(TcpConfig::new(host, port)))
            }
            None => Ok(Self::Serial(SerialConfig::new(path))),
        }
    }
}
