use std::cell::RefCell;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transport::{SubscribeRequest, SubscribeResponse, SubscribeTransport};

/// Fake `/subscribe` endpoint: records requests and answers with a canned reply.
pub struct RecordingTransport {
    reply: Result<SubscribeResponse, TransportError>,
    requests: RefCell<Vec<SubscribeRequest>>,
    probe: RefCell<Option<Box<dyn Fn()>>>,
}

impl RecordingTransport {
    pub fn replying(success: bool, message: &str) -> Self {
        RecordingTransport {
            reply: Ok(SubscribeResponse {
                success,
                message: message.to_string(),
            }),
            requests: RefCell::new(Vec::new()),
            probe: RefCell::new(None),
        }
    }

    pub fn failing(error: &str) -> Self {
        RecordingTransport {
            reply: Err(TransportError(error.to_string())),
            requests: RefCell::new(Vec::new()),
            probe: RefCell::new(None),
        }
    }

    /// Run `f` while a request is in flight.
    pub fn on_request(&self, f: impl Fn() + 'static) {
        *self.probe.borrow_mut() = Some(Box::new(f));
    }

    pub fn requests(&self) -> Vec<SubscribeRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SubscribeTransport for RecordingTransport {
    async fn subscribe(&self, req: &SubscribeRequest) -> Result<SubscribeResponse, TransportError> {
        self.requests.borrow_mut().push(req.clone());
        if let Some(probe) = self.probe.borrow().as_ref() {
            probe();
        }
        self.reply.clone()
    }
}
