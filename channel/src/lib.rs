//! A bounded, non-blocking-to-enqueue request queue.
//!
//! Many producers call [`QueueSender::try_enqueue`] concurrently; exactly
//! one consumer — the broker's worker thread — drains it with
//! [`QueueReceiver::recv_timeout`]. This is the SPMC-in, SPSC-out shape
//! this design calls for: backpressure comes for free from
//! [`std::sync::mpsc::sync_channel`]'s bounded capacity, so this crate is a
//! thin, named wrapper rather than a hand-rolled ring buffer.

use std::sync::mpsc::{self, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

/// The queue is full; `try_enqueue` never blocks waiting for room.
#[derive(Debug, thiserror::Error)]
#[error("queue is full")]
pub struct QueueFullError;

/// The producer side. Cheap to clone — every caller into the facade holds
/// its own clone.
pub struct QueueSender<T> {
    inner: SyncSender<T>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    /// Enqueue `item` if there is room, otherwise fail immediately.
    ///
    /// Never suspends: this is the non-blocking enqueue callers require.
    pub fn try_enqueue(&self, item: T) -> Result<(), QueueFullError> {
        match self.inner.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(QueueFullError),
            // The receiver is only dropped when the worker thread exits,
            // which only happens on broker shutdown; callers don't
            // distinguish that from a full queue at this layer.
            Err(TrySendError::Disconnected(_)) => Err(QueueFullError),
        }
    }
}

/// The single-consumer side, owned by the broker's worker thread.
pub struct QueueReceiver<T> {
    inner: mpsc::Receiver<T>,
}

impl<T> QueueReceiver<T> {
    /// Block for up to `timeout` waiting for the next item.
    ///
    /// Returns `None` on timeout or if every sender has been dropped, so
    /// the worker loop can treat both as "nothing to do right now" and
    /// re-check its own control channel.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.inner.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Create a bounded queue with room for `capacity` outstanding items.
pub fn bounded<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (QueueSender { inner: tx }, QueueReceiver { inner: rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_and_drain_preserve_fifo_order() {
        let (tx, rx) = bounded::<u32>(10);
        for i in 0..5 {
            tx.try_enqueue(i).unwrap();
        }
        for i in 0..5 {
            assert_eq!(rx.recv_timeout(Duration::from_millis(100)), Some(i));
        }
    }

    #[test]
    fn enqueue_fails_once_capacity_is_reached() {
        let (tx, _rx) = bounded::<u32>(10);
        for i in 0..10 {
            tx.try_enqueue(i).unwrap();
        }
        assert!(tx.try_enqueue(10).is_err());
    }

    #[test]
    fn recv_timeout_returns_none_when_empty() {
        let (_tx, rx) = bounded::<u32>(10);
        assert_eq!(rx.recv_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn sender_clones_share_the_same_backing_queue() {
        let (tx, rx) = bounded::<u32>(10);
        let tx2 = tx.clone();
        tx.try_enqueue(1).unwrap();
        tx2.try_enqueue(2).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_millis(100)), Some(1));
        assert_eq!(rx.recv_timeout(Duration::from_millis(100)), Some(2));
    }
}
