//! Questline CLI — error types.

use questline_session::SessionError;
use thiserror::Error;

/// Startup and runtime errors for the terminal host.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    /// A controller operation failed in a way the loop cannot recover from.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}
