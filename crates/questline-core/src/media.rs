//! Media playback capability.

use async_trait::async_trait;

use crate::error::PlaybackError;

/// One clip to play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    /// Resource locator of the clip.
    pub url: String,
    /// Output volume in `[0.0, 1.0]`.
    pub volume: f32,
}

impl PlaybackRequest {
    /// Requests playback of `url` at full volume.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            volume: 1.0,
        }
    }

    /// Overrides the output volume, clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}

/// Plays a single resource and resolves when playback ends or fails.
///
/// Implementations must resolve on both the natural end of the media and on
/// any media error. Overlapping calls are permitted.
#[async_trait]
pub trait MediaPlayback: Send + Sync {
    /// Plays the clip to completion.
    async fn play(&self, request: PlaybackRequest) -> Result<(), PlaybackError>;
}
