//! Test transports: mock `SessionTransport` implementations for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use questline_core::error::TransportError;
use questline_core::step::{SessionId, Step};
use questline_core::transport::{
    AdvanceRequest, AdvanceResponse, RestartSessionRequest, RestartSessionResponse,
    SessionTransport, StartSessionRequest, StartSessionResponse,
};
use tokio::sync::Notify;

/// A call observed by a mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `start_session` was called.
    Start(StartSessionRequest),
    /// `advance` was called.
    Advance(AdvanceRequest),
    /// `restart_session` was called.
    Restart(RestartSessionRequest),
}

/// A transport that records every call and answers from a queue of scripted
/// step results, in order, regardless of which operation was called.
///
/// When the queue is empty every call fails with a network error. Calls can
/// be held open with [`RecordingTransport::hold`] to observe the controller
/// while a round-trip is outstanding.
#[derive(Debug)]
pub struct RecordingTransport {
    session_id: SessionId,
    responses: Mutex<VecDeque<Result<Step, TransportError>>>,
    calls: Mutex<Vec<TransportCall>>,
    held: AtomicBool,
    released: Notify,
}

impl RecordingTransport {
    /// Create a transport that assigns `session_id` on start and answers with
    /// `responses` in order.
    #[must_use]
    pub fn new(session_id: &str, responses: Vec<Result<Step, TransportError>>) -> Self {
        Self {
            session_id: SessionId::new(session_id),
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            held: AtomicBool::new(false),
            released: Notify::new(),
        }
    }

    /// Queues one more scripted result.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_response(&self, response: Result<Step, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Returns a snapshot of all calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes the next call wait until [`RecordingTransport::release`].
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Lets a held call proceed.
    pub fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.released.notify_one();
    }

    async fn respond(&self, call: TransportCall) -> Result<Step, TransportError> {
        self.calls.lock().unwrap().push(call);
        if self.held.load(Ordering::SeqCst) {
            self.released.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".into())))
    }
}

#[async_trait]
impl SessionTransport for RecordingTransport {
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<StartSessionResponse, TransportError> {
        let step = self.respond(TransportCall::Start(request)).await?;
        Ok(StartSessionResponse {
            session_id: self.session_id.clone(),
            step,
        })
    }

    async fn advance(&self, request: AdvanceRequest) -> Result<AdvanceResponse, TransportError> {
        let step = self.respond(TransportCall::Advance(request)).await?;
        Ok(AdvanceResponse { step })
    }

    async fn restart_session(
        &self,
        request: RestartSessionRequest,
    ) -> Result<RestartSessionResponse, TransportError> {
        let step = self.respond(TransportCall::Restart(request)).await?;
        Ok(RestartSessionResponse { step })
    }
}

/// A transport that always fails with a network error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingTransport;

#[async_trait]
impl SessionTransport for FailingTransport {
    async fn start_session(
        &self,
        _request: StartSessionRequest,
    ) -> Result<StartSessionResponse, TransportError> {
        Err(TransportError::Network("connection refused".into()))
    }

    async fn advance(&self, _request: AdvanceRequest) -> Result<AdvanceResponse, TransportError> {
        Err(TransportError::Network("connection refused".into()))
    }

    async fn restart_session(
        &self,
        _request: RestartSessionRequest,
    ) -> Result<RestartSessionResponse, TransportError> {
        Err(TransportError::Network("connection refused".into()))
    }
}
