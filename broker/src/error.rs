//! Errors a broker-dispatched request can resolve with.

use fxplc_core::ClientError;

/// Everything a caller waiting on a broker request can observe.
///
/// `Client` carries through a non-retryable [`ClientError`] unchanged — it
/// surfaces on its first occurrence; `RequestFailed` is the broker's own
/// kind, raised only after 5 retryable attempts are exhausted.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("request queue is full")]
    QueueFull,
    #[error("service is paused")]
    ServicePaused,
    #[error("request exceeded its deadline")]
    RequestTimeout,
    #[error("plc operation failed: {0}")]
    Client(#[from] ClientError),
    #[error("request failed after exhausting retries")]
    RequestFailed,
    #[error("request was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, BrokerError>;
