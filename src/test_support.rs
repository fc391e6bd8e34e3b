//! Fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::net::error::TransportError;
use crate::net::http::{HttpRequest, HttpResponse, Transport};
use crate::state::navigation::{NavigationRequest, Navigator};

#[derive(Clone, Default)]
pub(crate) struct RecordingNavigator {
    requests: Arc<Mutex<Vec<NavigationRequest>>>,
}

impl RecordingNavigator {
    pub(crate) fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, request: NavigationRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

/// Transport that replays queued outcomes and records what it was sent.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    sent: Arc<Mutex<Vec<(String, HttpRequest)>>>,
}

impl ScriptedTransport {
    pub(crate) fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn fail(&self, err: TransportError) -> &Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub(crate) fn sent(&self) -> Vec<(String, HttpRequest)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.sent().pop().map(|(_, r)| r).unwrap()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, url: &str, request: &HttpRequest, _timeout_ms: u32) -> Result<HttpResponse, TransportError> {
        self.sent.lock().unwrap().push((url.to_owned(), request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".to_owned())))
    }
}
