//! The broker's single worker thread: connect, serve, retry, reconnect.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use fxplc_core::PlcClient;
#[cfg(feature = "mock")]
use fxplc_core::MockClient;
use fxplc_core::Client;
use fxplc_transport::{SerialTransport, TcpTransport, Transport};

use crate::error::BrokerError;
use crate::request::QueuedRequest;
use crate::target::TransportTarget;

/// Maximum attempts per request, including the first try.
const MAX_ATTEMPTS: u32 = 5;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Messages from the broker handle to its worker thread.
pub(crate) enum Control {
    /// Pause. If this is a tunnel request, the worker sends the
    /// relinquished transport (or `None`, if there is no real transport to
    /// give up — e.g. in mock mode) back over the carried sender.
    Pause(Option<Sender<Option<Box<dyn Transport>>>>),
    Resume,
    Shutdown,
}

fn open_client(target: &TransportTarget) -> Result<Box<dyn PlcClient>, ()> {
    match target {
        TransportTarget::Serial(cfg) => {
            let transport = SerialTransport::open(cfg).map_err(|_| ())?;
            Ok(Box::new(Client::new(Box::new(transport))) as Box<dyn PlcClient>)
        }
        TransportTarget::Tcp(cfg) => {
            let transport = TcpTransport::connect(cfg).map_err(|_| ())?;
            Ok(Box::new(Client::new(Box::new(transport))) as Box<dyn PlcClient>)
        }
        #[cfg(feature = "mock")]
        TransportTarget::Mock => Ok(Box::new(MockClient::new()) as Box<dyn PlcClient>),
    }
}

/// Drain and cancel everything currently sitting in the queue.
///
/// Called when pausing: a request that is queued but not
/// yet executing does not survive a pause.
fn cancel_all_queued(queue_rx: &fxplc_channel::QueueReceiver<QueuedRequest>) {
    while let Some(req) = queue_rx.recv_timeout(Duration::ZERO) {
        req.fail(BrokerError::Cancelled);
    }
}

/// Block until `Resume` or `Shutdown` arrives, discarding anything the
/// queue accumulates in the meantime.
///
/// Returns `true` to reopen a client and resume serving, `false` to exit
/// the worker thread entirely.
fn wait_paused(
    control_rx: &Receiver<Control>,
    queue_rx: &fxplc_channel::QueueReceiver<QueuedRequest>,
) -> bool {
    loop {
        cancel_all_queued(queue_rx);
        match control_rx.recv() {
            Ok(Control::Resume) => return true,
            Ok(Control::Shutdown) => return false,
            Ok(Control::Pause(reply)) => {
                if let Some(reply) = reply {
                    let _ = reply.send(None);
                }
                continue;
            }
            Err(_) => return false,
        }
    }
}

/// Run one queued request to completion, retrying retryable
/// [`fxplc_core::ClientError`] kinds up to [`MAX_ATTEMPTS`] times.
///
/// Returns `true` if the client's framing is now untrusted and the
/// transport must be torn down before serving the next request.
fn execute(req: QueuedRequest, client: &mut dyn PlcClient) -> bool {
    if req.is_past_deadline() {
        req.fail(BrokerError::RequestTimeout);
        return false;
    }

    for attempt in 1..=MAX_ATTEMPTS {
        match (req.op)(client) {
            Ok(value) => {
                req.resolve(Ok(value));
                return false;
            }
            Err(e) if e.is_retryable() => {
                if attempt == MAX_ATTEMPTS {
                    log::warn!("[broker] request failed after {MAX_ATTEMPTS} attempts: {e}");
                    req.fail(BrokerError::RequestFailed);
                    return true;
                }
                log::debug!("[broker] attempt {attempt} failed ({e}), retrying");
                thread::sleep(RETRY_BACKOFF);
            }
            Err(e) => {
                req.fail(BrokerError::Client(e));
                return false;
            }
        }
    }
    unreachable!("loop always returns by attempt == MAX_ATTEMPTS")
}

/// The worker thread body. Runs until `Control::Shutdown` or the control
/// channel disconnects.
///
/// Delegates to [`run_with_opener`] with an opener built from `target`; kept
/// as a separate entry point so tests can inject a scripted client opener
/// without going through a real [`TransportTarget`].
pub(crate) fn run(
    target: TransportTarget,
    queue_rx: fxplc_channel::QueueReceiver<QueuedRequest>,
    control_rx: Receiver<Control>,
) {
    run_with_opener(move || open_client(&target), queue_rx, control_rx)
}

/// Same worker loop as [`run`], parameterized over how a client is opened —
/// the production path always opens a real [`fxplc_core::Client`] (or the
/// mock) against a fixed [`TransportTarget`]; tests substitute a scripted
/// opener to exercise retry and reconnect behavior deterministically.
pub(crate) fn run_with_opener(
    mut open: impl FnMut() -> Result<Box<dyn PlcClient>, ()>,
    queue_rx: fxplc_channel::QueueReceiver<QueuedRequest>,
    control_rx: Receiver<Control>,
) {
    'reconnect: loop {
        // A pause (or shutdown) requested while disconnected must be
        // honored before dialing again.
        match control_rx.try_recv() {
            Ok(Control::Shutdown) => return,
            Ok(Control::Pause(reply)) => {
                if let Some(reply) = reply {
                    let _ = reply.send(None);
                }
                cancel_all_queued(&queue_rx);
                if !wait_paused(&control_rx, &queue_rx) {
                    return;
                }
                continue 'reconnect;
            }
            Ok(Control::Resume) | Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return,
        }

        let mut client = match open() {
            Ok(c) => {
                log::info!("[broker] client connected");
                c
            }
            Err(()) => {
                log::warn!("[broker] connect failed, retrying in {RECONNECT_BACKOFF:?}");
                thread::sleep(RECONNECT_BACKOFF);
                continue 'reconnect;
            }
        };

        'serve: loop {
            match control_rx.try_recv() {
                Ok(Control::Shutdown) => return,
                Ok(Control::Pause(reply)) => {
                    let transport = client.into_transport();
                    if let Some(reply) = reply {
                        let _ = reply.send(transport);
                    }
                    cancel_all_queued(&queue_rx);
                    if !wait_paused(&control_rx, &queue_rx) {
                        return;
                    }
                    continue 'reconnect;
                }
                Ok(Control::Resume) | Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => return,
            }

            match queue_rx.recv_timeout(POLL_INTERVAL) {
                None => continue 'serve,
                Some(req) => {
                    if execute(req, client.as_mut()) {
                        log::warn!("[broker] tearing down client after exhausted retries");
                        continue 'reconnect;
                    }
                }
            }
        }
    }
}
