//! Single-link request broker for the FX-series PLC gateway.
//!
//! A [`Broker`] owns exactly one worker thread, which in turn owns exactly
//! one live [`fxplc_core::PlcClient`]. Every caller — REST handlers, the
//! registry, anything else — submits work through [`Broker::execute`]
//! rather than touching a client directly, so requests against the single
//! physical link are always serialized. Grounded in the original
//! implementation's `serial_task_loop` plus the worker-thread pattern in
//! the trybotster broker example.

mod error;
mod request;
mod target;
mod tunnel;
mod value;
mod worker;

pub use error::{BrokerError, Result};
pub use request::Operation;
pub use target::{TargetParseError, TransportTarget};
pub use tunnel::TransportHandle;
pub use value::Value;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use fxplc_core::PlcClient;
use request::QueuedRequest;
use worker::Control;

/// Requests sitting in the queue but not yet being served.
const QUEUE_CAPACITY: usize = 10;

/// How long [`Broker::execute`] waits for its result before giving up on
/// the worker ever answering (distinct from the worker's own internal
/// per-attempt retry timing).
const EXECUTE_TIMEOUT: Duration = Duration::from_secs(10);

/// A handle to the running worker thread and its request queue.
///
/// Cloning a `Broker` is not supported; instead clone the channel ends you
/// need (`Broker` itself is cheap to wrap in an `Arc` if multiple owners
/// are required, since every method only needs `&self`).
pub struct Broker {
    queue_tx: fxplc_channel::QueueSender<QueuedRequest>,
    control_tx: Sender<Control>,
    paused: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Broker {
    /// Start the worker thread against `target`. Connection is attempted
    /// lazily, on the worker thread, the moment it is created.
    pub fn start(target: TransportTarget) -> Self {
        let (queue_tx, queue_rx) = fxplc_channel::bounded(QUEUE_CAPACITY);
        let (control_tx, control_rx) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("fxplc-broker".into())
            .spawn(move || worker::run(target, queue_rx, control_rx))
            .expect("spawning the broker worker thread");

        Self {
            queue_tx,
            control_tx,
            paused: Arc::new(AtomicBool::new(false)),
            worker: Some(worker),
        }
    }

    /// Enqueue `op` without waiting for it to run. Returns immediately
    /// with [`BrokerError::ServicePaused`] or [`BrokerError::QueueFull`] if
    /// it cannot be accepted, otherwise a receiver the caller can poll (or
    /// drop, if the result is uninteresting).
    pub fn enqueue(
        &self,
        op: Operation,
    ) -> Result<mpsc::Receiver<Result<Value>>> {
        if self.paused.load(Ordering::Acquire) {
            return Err(BrokerError::ServicePaused);
        }
        let (responder, response_rx) = mpsc::channel();
        let req = QueuedRequest {
            op,
            deadline: Instant::now() + EXECUTE_TIMEOUT,
            responder,
        };
        self.queue_tx
            .try_enqueue(req)
            .map_err(|_| BrokerError::QueueFull)?;
        Ok(response_rx)
    }

    /// Enqueue `op` and block for up to 10 seconds for its result.
    pub fn execute(&self, op: Operation) -> Result<Value> {
        let response_rx = self.enqueue(op)?;
        response_rx
            .recv_timeout(EXECUTE_TIMEOUT)
            .unwrap_or(Err(BrokerError::RequestTimeout))
    }

    /// Pause dispatch. Anything already queued is cancelled; new calls to
    /// [`Broker::enqueue`]/[`Broker::execute`] fail immediately until
    /// [`Broker::resume`].
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        let _ = self.control_tx.send(Control::Pause(None));
    }

    /// Pause dispatch and take ownership of the underlying transport for
    /// an external tunnel to use directly.
    ///
    /// Returns `None` if the worker has no live transport to hand over
    /// (disconnected, or running in mock mode).
    pub fn pause_for_tunnel(&self) -> Option<TransportHandle> {
        self.paused.store(true, Ordering::Release);
        let (reply_tx, reply_rx) = mpsc::channel();
        self.control_tx.send(Control::Pause(Some(reply_tx))).ok()?;
        reply_rx
            .recv_timeout(EXECUTE_TIMEOUT)
            .ok()
            .flatten()
            .map(TransportHandle::new)
    }

    /// Resume dispatch after [`Broker::pause`] or [`Broker::pause_for_tunnel`].
    ///
    /// The worker reconnects with a fresh client before serving the next
    /// request, whether or not a tunnel handle was ever returned.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        let _ = self.control_tx.send(Control::Resume);
    }

    /// Whether the broker is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Stop the worker thread and wait for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.control_tx.send(Control::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        let _ = self.control_tx.send(Control::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Build an [`Operation`] from a closure over a live [`PlcClient`].
///
/// A thin named constructor so call sites in `fxplc-registry`/`fxplc-api`
/// read as `op(|c| c.read_bit(reg))` rather than a raw `Box::new`.
pub fn op<F>(f: F) -> Operation
where
    F: Fn(&mut dyn PlcClient) -> fxplc_core::Result<Value> + Send + 'static,
{
    Box::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxplc_core::{Number, NumberEncoding, RegisterClass, RegisterRef};

    fn start_mock() -> Broker {
        Broker::start(TransportTarget::Mock)
    }

    #[test]
    fn execute_round_trips_a_bit_write_then_read() {
        let broker = start_mock();
        let reg = RegisterRef {
            class: RegisterClass::Memory,
            index: 17,
        };

        let write_reg = reg;
        broker
            .execute(op(move |c| {
                c.write_bit(write_reg, true)?;
                Ok(Value::Unit)
            }))
            .unwrap();

        let value = broker
            .execute(op(move |c| Ok(Value::Bool(c.read_bit(reg)?))))
            .unwrap();
        assert_eq!(value, Value::Bool(true));
        broker.shutdown();
    }

    #[test]
    fn execute_round_trips_a_number_write_then_read() {
        let broker = start_mock();
        let reg = RegisterRef {
            class: RegisterClass::Data,
            index: 100,
        };
        let encoding = NumberEncoding::WordSigned;

        broker
            .execute(op(move |c| {
                c.write_number(reg, Number::Signed(-1), encoding)?;
                Ok(Value::Unit)
            }))
            .unwrap();

        let value = broker
            .execute(op(move |c| Ok(Value::Number(c.read_number(reg, encoding)?))))
            .unwrap();
        assert_eq!(value, Value::Number(Number::Signed(-1)));
        broker.shutdown();
    }

    #[test]
    fn pause_rejects_new_requests_immediately() {
        let broker = start_mock();
        broker.pause();
        let result = broker.execute(op(|_| Ok(Value::Unit)));
        assert!(matches!(result, Err(BrokerError::ServicePaused)));
        broker.shutdown();
    }

    #[test]
    fn resume_allows_requests_again() {
        let broker = start_mock();
        broker.pause();
        broker.resume();
        let result = broker.execute(op(|_| Ok(Value::Unit)));
        assert!(result.is_ok());
        broker.shutdown();
    }

    #[test]
    fn pause_for_tunnel_on_mock_client_yields_no_transport() {
        let broker = start_mock();
        let handle = broker.pause_for_tunnel();
        assert!(handle.is_none());
        broker.shutdown();
    }

    /// Property 5: enqueueing while 10 requests are outstanding returns
    /// `QueueFull` synchronously.
    ///
    /// The worker never drains the queue here because it is stuck retrying
    /// a connection to a serial path that cannot exist, so every enqueue up
    /// to capacity succeeds and the 11th observes backpressure immediately.
    #[test]
    fn enqueue_past_capacity_returns_queue_full() {
        let target = TransportTarget::Serial(fxplc_transport::SerialConfig::new(
            "/dev/nonexistent-fxplc-test-port",
        ));
        let broker = Broker::start(target);

        for _ in 0..QUEUE_CAPACITY {
            broker.enqueue(op(|_| Ok(Value::Unit))).unwrap();
        }
        assert!(matches!(
            broker.enqueue(op(|_| Ok(Value::Unit))),
            Err(BrokerError::QueueFull)
        ));
        broker.shutdown();
    }
}
