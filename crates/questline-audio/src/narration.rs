//! Narration player.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use questline_core::media::{MediaPlayback, PlaybackRequest};
use tracing::{debug, warn};

use crate::settings::SoundSettings;

/// Default bound on a single playback.
pub const DEFAULT_PLAYBACK_TIMEOUT: Duration = Duration::from_secs(600);

/// How a playback resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The media played to its end.
    Completed,
    /// The media errored or timed out.
    Failed,
    /// Nothing was played (muted, or nothing to play).
    Skipped,
}

/// Plays one resource at a time through the injected media capability.
///
/// A play always resolves: media errors and timeouts are logged and reported
/// as [`PlaybackOutcome::Failed`], never propagated.
#[derive(Clone)]
pub struct NarrationPlayer {
    media: Arc<dyn MediaPlayback>,
    settings: SoundSettings,
    timeout: Duration,
}

impl fmt::Debug for NarrationPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrationPlayer")
            .field("settings", &self.settings)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl NarrationPlayer {
    /// Creates a player with the default timeout.
    #[must_use]
    pub fn new(media: Arc<dyn MediaPlayback>, settings: SoundSettings) -> Self {
        Self {
            media,
            settings,
            timeout: DEFAULT_PLAYBACK_TIMEOUT,
        }
    }

    /// Overrides the playback bound.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The sound settings this player honours.
    #[must_use]
    pub fn settings(&self) -> &SoundSettings {
        &self.settings
    }

    /// Plays `url` at full volume.
    pub async fn play(&self, url: &str) -> PlaybackOutcome {
        self.play_request(PlaybackRequest::new(url)).await
    }

    /// Plays an arbitrary request.
    pub async fn play_request(&self, request: PlaybackRequest) -> PlaybackOutcome {
        if self.settings.is_muted() {
            debug!(url = %request.url, "muted, skipping playback");
            return PlaybackOutcome::Skipped;
        }

        let url = request.url.clone();
        debug!(url = %url, "starting playback");
        match tokio::time::timeout(self.timeout, self.media.play(request)).await {
            Ok(Ok(())) => {
                debug!(url = %url, "playback completed");
                PlaybackOutcome::Completed
            }
            Ok(Err(error)) => {
                warn!(url = %url, error = %error, "playback failed");
                PlaybackOutcome::Failed
            }
            Err(_) => {
                warn!(url = %url, timeout_secs = self.timeout.as_secs(), "playback timed out");
                PlaybackOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_core::error::PlaybackError;
    use questline_test_support::{GatedMedia, ScriptedMedia};

    #[tokio::test]
    async fn test_play_reports_completed_on_natural_end() {
        // Arrange
        let media = Arc::new(ScriptedMedia::completing());
        let player = NarrationPlayer::new(media.clone(), SoundSettings::default());

        // Act
        let outcome = player.play("http://localhost/static/s0.mp3").await;

        // Assert
        assert_eq!(outcome, PlaybackOutcome::Completed);
        let played = media.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].url, "http://localhost/static/s0.mp3");
    }

    #[tokio::test]
    async fn test_play_absorbs_media_error() {
        // Arrange
        let media = Arc::new(ScriptedMedia::failing(PlaybackError::Unreachable(
            "404".into(),
        )));
        let player = NarrationPlayer::new(media, SoundSettings::default());

        // Act
        let outcome = player.play("http://localhost/missing.mp3").await;

        // Assert
        assert_eq!(outcome, PlaybackOutcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_times_out_on_media_that_never_resolves() {
        // Arrange
        let media = Arc::new(GatedMedia::new());
        let player = NarrationPlayer::new(media.clone(), SoundSettings::default())
            .with_timeout(Duration::from_secs(5));

        // Act
        let outcome = player.play("http://localhost/hang.mp3").await;

        // Assert
        assert_eq!(outcome, PlaybackOutcome::Failed);
        assert_eq!(media.played().len(), 1);
    }

    #[tokio::test]
    async fn test_play_skips_media_when_muted() {
        // Arrange
        let media = Arc::new(ScriptedMedia::completing());
        let player = NarrationPlayer::new(media.clone(), SoundSettings::new(true));

        // Act
        let outcome = player.play("http://localhost/static/s0.mp3").await;

        // Assert
        assert_eq!(outcome, PlaybackOutcome::Skipped);
        assert!(media.played().is_empty());
    }
}
