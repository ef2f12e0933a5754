//! Errors observable at the PLC client boundary.

/// Errors a client operation can fail with.
///
/// This is the closed set from the wire protocol and the address-map layer;
/// transport-level errors are folded into [`ClientError::NoResponse`] or
/// [`ClientError::NotConnected`] at the point where the client touches the
/// transport, so callers above the client never see a raw
/// `fxplc_transport::TransportError`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A register reference was unparseable, or its class has no mapping
    /// for the requested address space (bit image, force bit, word data).
    #[error("invalid register reference")]
    InvalidRegister,
    /// The PLC replied NAK (0x15) to the command.
    #[error("plc does not support this command")]
    NotSupportedCommand,
    /// The link stayed silent within the transport's read deadline, or the
    /// transport reported an unclassified connection loss mid-exchange.
    #[error("no response from plc")]
    NoResponse,
    /// The response frame was the wrong shape, had a bad checksum, or
    /// decoded to the wrong number of bytes for the operation.
    #[error("malformed response from plc")]
    ResponseMalformed,
    /// The transport was never connected, or was closed before the call.
    #[error("transport not connected")]
    NotConnected,
}

impl ClientError {
    /// True for the two kinds the broker is allowed to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoResponse | Self::ResponseMalformed)
    }
}

impl From<fxplc_transport::TransportError> for ClientError {
    fn from(err: fxplc_transport::TransportError) -> Self {
        use fxplc_transport::TransportError as T;
        match err {
            T::Timeout => Self::NoResponse,
            T::ConnectionClosed => Self::NoResponse,
            T::NotConnected => Self::NotConnected,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
