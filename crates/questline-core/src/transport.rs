//! Session transport abstraction.
//!
//! Each operation is a single request/response exchange with the story
//! server, modeled as a typed request/response pair.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::step::{SessionId, Step, StepId};

/// Request to open a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionRequest {
    /// Story theme.
    pub theme: String,
    /// Session-establishing identifier supplied by character creation.
    pub session_seed: String,
}

/// Response to [`StartSessionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionResponse {
    /// Server-assigned session identifier.
    pub session_id: SessionId,
    /// The opening step.
    pub step: Step,
}

/// Request to advance past the current step by picking a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceRequest {
    /// Session being played.
    pub session_id: SessionId,
    /// Step the choice was made on.
    pub current_step_id: StepId,
    /// Zero-based index into the current step's choices.
    pub choice_index: usize,
}

/// Response to [`AdvanceRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceResponse {
    /// The next step.
    pub step: Step,
}

/// Request to restart a session from its opening step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartSessionRequest {
    /// Session to restart.
    pub session_id: SessionId,
}

/// Response to [`RestartSessionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartSessionResponse {
    /// The step to resume from, normally the first one.
    pub step: Step,
}

/// The three server round-trips the session controller depends on.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Opens a session and returns its identifier with the first step.
    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<StartSessionResponse, TransportError>;

    /// Submits a choice and returns the resulting step.
    async fn advance(&self, request: AdvanceRequest) -> Result<AdvanceResponse, TransportError>;

    /// Restarts the session and returns the step to resume from.
    async fn restart_session(
        &self,
        request: RestartSessionRequest,
    ) -> Result<RestartSessionResponse, TransportError>;
}
