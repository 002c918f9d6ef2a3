//! Error types shared across the client.

use thiserror::Error;

/// A failed round-trip to the story server.
///
/// The session controller treats every variant the same way; the split exists
/// for logging and for transport-level tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("server responded with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The request never completed (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded into the expected payload.
    #[error("decode error: {0}")]
    Decode(String),
}

/// A media playback failure.
///
/// Playback errors never escalate past the audio layer; they are absorbed and
/// treated as "done" so the interaction loop cannot get stuck on bad media.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The resource could not be fetched.
    #[error("media resource unreachable: {0}")]
    Unreachable(String),

    /// The resource was fetched but could not be played.
    #[error("media error: {0}")]
    Media(String),
}
