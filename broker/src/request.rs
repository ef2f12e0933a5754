//! The broker's internal request record.

use std::sync::mpsc::Sender;
use std::time::Instant;

use fxplc_core::PlcClient;

use crate::error::{BrokerError, Result as BrokerResult};
use crate::value::Value;

/// A thunk over a bound client, producing a [`Value`].
///
/// `Fn`, not `FnOnce`: the worker may invoke it up to 5 times across
/// retries, so it must not consume anything by value.
pub type Operation = Box<dyn Fn(&mut dyn PlcClient) -> fxplc_core::Result<Value> + Send>;

/// One enqueued unit of work, created on enqueue and resolved exactly once.
pub struct QueuedRequest {
    pub op: Operation,
    pub deadline: Instant,
    pub responder: Sender<BrokerResult<Value>>,
}

impl QueuedRequest {
    pub fn is_past_deadline(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn resolve(self, result: BrokerResult<Value>) {
        let _ = self.responder.send(result);
    }

    pub fn fail(self, err: BrokerError) {
        let _ = self.responder.send(Err(err));
    }
}
