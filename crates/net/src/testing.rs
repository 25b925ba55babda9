//! In-memory transport for deterministic tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use core_types::RequestId;
use serde_json::Value;

use crate::{FetchReply, FetchRequest, Transport, TransportError};

#[derive(Default)]
struct Recorded {
    sent: Vec<FetchRequest>,
    cancelled: Vec<RequestId>,
    pending: HashMap<RequestId, Sender<FetchReply>>,
}

/// Records every request and lets the test answer them later, in any order.
///
/// Cancelling does not stop delivery: a test can still `respond` to a cancelled
/// request, which is how a transport that ignores aborts behaves.
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: Rc<RefCell<Recorded>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<FetchRequest> {
        self.inner.borrow().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.inner.borrow().sent.len()
    }

    pub fn last(&self) -> Option<FetchRequest> {
        self.inner.borrow().sent.last().cloned()
    }

    pub fn cancelled(&self) -> Vec<RequestId> {
        self.inner.borrow().cancelled.clone()
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.inner.borrow().pending.contains_key(&request_id)
    }

    /// Deliver a reply. Returns `false` if the request is unknown or was
    /// already answered.
    pub fn respond(&self, request_id: RequestId, result: Result<Value, TransportError>) -> bool {
        let Some(tx) = self.inner.borrow_mut().pending.remove(&request_id) else {
            return false;
        };
        tx.send(FetchReply { request_id, result }).is_ok()
    }

    pub fn respond_ok(&self, request_id: RequestId, payload: Value) -> bool {
        self.respond(request_id, Ok(payload))
    }

    pub fn respond_err(&self, request_id: RequestId, err: TransportError) -> bool {
        self.respond(request_id, Err(err))
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: FetchRequest, reply: Sender<FetchReply>) {
        let mut inner = self.inner.borrow_mut();
        inner.pending.insert(request.request_id, reply);
        inner.sent.push(request);
    }

    fn cancel(&self, request_id: RequestId) {
        self.inner.borrow_mut().cancelled.push(request_id);
    }
}
