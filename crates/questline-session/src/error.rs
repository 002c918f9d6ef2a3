//! Session controller errors.

use questline_core::error::TransportError;
use thiserror::Error;

/// Why a controller operation did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Missing or invalid input from the caller. No request was sent.
    #[error("caller contract violated: {0}")]
    CallerContract(String),

    /// Choices are withheld until the current narration finishes.
    #[error("narration is still playing")]
    NarrationInProgress,

    /// A round-trip is already outstanding.
    #[error("a request is already in flight")]
    Busy,

    /// The operation is not defined in the current state.
    #[error("{operation} is not available while {state}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The state it was attempted in.
        state: &'static str,
    },

    /// The server round-trip failed; the controller is now errored.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The controller was torn down.
    #[error("session controller has been disposed")]
    Disposed,
}
