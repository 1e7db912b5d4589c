//! The first-writer-wins register

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use may::sync::Mutex;

use crate::server::{HttpService, Request, Response};

/// Outcome of a check-and-set on a `ValueCell`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// the cell was unset and now holds the caller's value
    Won(Bytes),
    /// the cell already held this value, the caller's value was dropped
    Taken(Bytes),
}

impl Claim {
    /// the value stored in the cell
    pub fn value(&self) -> &Bytes {
        match *self {
            Claim::Won(ref v) | Claim::Taken(ref v) => v,
        }
    }

    pub fn into_value(self) -> Bytes {
        match self {
            Claim::Won(v) | Claim::Taken(v) => v,
        }
    }

    pub fn is_winner(&self) -> bool {
        match *self {
            Claim::Won(_) => true,
            Claim::Taken(_) => false,
        }
    }
}

/// A write-once slot
///
/// Starts unset. The first `get_or_set` stores its value, which then never
/// changes; an empty value counts as a write.
pub struct ValueCell {
    value: Mutex<Option<Bytes>>,
}

impl ValueCell {
    pub fn new() -> Self {
        ValueCell {
            value: Mutex::new(None),
        }
    }

    /// store `candidate` if the cell is unset, and return what the cell holds
    ///
    /// the check and the store happen under one lock, concurrent callers
    /// agree on a single winner
    pub fn get_or_set(&self, candidate: Bytes) -> Claim {
        let mut value = match self.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match *value {
            Some(ref stored) => Claim::Taken(stored.clone()),
            None => {
                *value = Some(candidate.clone());
                Claim::Won(candidate)
            }
        }
    }

    /// the stored value, `None` while the cell is unset
    pub fn get(&self) -> Option<Bytes> {
        match self.value.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl Default for ValueCell {
    fn default() -> Self {
        ValueCell::new()
    }
}

impl fmt::Debug for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.get() {
            Some(v) => write!(f, "ValueCell({:?})", v),
            None => write!(f, "ValueCell(<unset>)"),
        }
    }
}

/// Http service that records the first POST body and echoes it to everybody
///
/// Clones share the same cell; independent registers come from `new`.
#[derive(Debug, Clone, Default)]
pub struct FirstWriterRegister {
    cell: Arc<ValueCell>,
}

impl FirstWriterRegister {
    pub fn new() -> Self {
        FirstWriterRegister {
            cell: Arc::new(ValueCell::new()),
        }
    }

    /// the cell behind this register
    pub fn cell(&self) -> &ValueCell {
        &self.cell
    }

    /// record `body` if nothing was posted before, return the first body ever posted
    pub fn handle_post(&self, body: Bytes) -> Bytes {
        let claim = self.cell.get_or_set(body);
        info!(
            "got POST request, first responder is: {}",
            String::from_utf8_lossy(claim.value())
        );
        claim.into_value()
    }
}

impl HttpService for FirstWriterRegister {
    fn handle(&self, mut req: Request, rsp: &mut Response) {
        rsp.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        if *req.method() != Method::POST {
            debug!("unsupported method {}", req.method());
            *rsp.status_mut() = StatusCode::NOT_IMPLEMENTED;
            if let Err(e) = rsp.send(b"") {
                debug!("failed to write response: {}", e);
            }
            return;
        }

        let mut body = Vec::new();
        if let Err(e) = req.read_to_end(&mut body) {
            debug!("failed to read request body: {}", e);
            *rsp.status_mut() = StatusCode::BAD_REQUEST;
            rsp.set_keep_alive(false);
            if let Err(e) = rsp.send(b"") {
                debug!("failed to write response: {}", e);
            }
            return;
        }

        let value = self.handle_post(Bytes::from(body));
        if let Err(e) = rsp.send(&value) {
            debug!("failed to write response: {}", e);
        }
    }
}
