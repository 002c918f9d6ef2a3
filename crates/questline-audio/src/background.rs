//! Looping background music.

use std::fmt;
use std::sync::{Arc, Mutex};

use questline_core::media::{MediaPlayback, PlaybackRequest};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::settings::SoundSettings;

/// Track shipped with the game server.
pub const DEFAULT_TRACK: &str = "/static/audio/background_music.mp3";

/// Background music sits under narration and voice lines.
pub const DEFAULT_VOLUME: f32 = 0.1;

/// Replays one track in a loop until stopped.
///
/// Muting interrupts the current pass; the loop resumes from the start of the
/// track once unmuted.
pub struct BackgroundMusic {
    media: Arc<dyn MediaPlayback>,
    settings: SoundSettings,
    request: PlaybackRequest,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for BackgroundMusic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundMusic")
            .field("request", &self.request)
            .field("playing", &self.is_playing())
            .finish_non_exhaustive()
    }
}

impl BackgroundMusic {
    /// Creates a player for `track` at [`DEFAULT_VOLUME`].
    #[must_use]
    pub fn new(media: Arc<dyn MediaPlayback>, settings: SoundSettings, track: &str) -> Self {
        Self {
            media,
            settings,
            request: PlaybackRequest::new(track).with_volume(DEFAULT_VOLUME),
            task: Mutex::new(None),
        }
    }

    /// Returns `true` while the loop is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.task
            .lock()
            .map(|task| task.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Starts the loop. Does nothing if it is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn play(&self) {
        let Ok(mut task) = self.task.lock() else {
            return;
        };
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        info!(url = %self.request.url, "starting background music");
        let media = Arc::clone(&self.media);
        let settings = self.settings.clone();
        let request = self.request.clone();
        *task = Some(tokio::spawn(run_loop(media, settings, request)));
    }

    /// Stops the loop.
    pub fn stop(&self) {
        let Ok(mut task) = self.task.lock() else {
            return;
        };
        if let Some(handle) = task.take() {
            info!("stopping background music");
            handle.abort();
        }
    }
}

impl Drop for BackgroundMusic {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    media: Arc<dyn MediaPlayback>,
    settings: SoundSettings,
    request: PlaybackRequest,
) {
    loop {
        settings.wait_until(false).await;

        tokio::select! {
            result = media.play(request.clone()) => {
                if let Err(error) = result {
                    warn!(url = %request.url, error = %error, "background music failed");
                    return;
                }
            }
            () = settings.wait_until(true) => {
                debug!("muted, pausing background music");
            }
        }

        // Zero-length tracks must not monopolise the runtime.
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_core::error::PlaybackError;
    use questline_test_support::{GatedMedia, ScriptedMedia};

    const TRACK: &str = "http://localhost/static/audio/background_music.mp3";

    #[tokio::test]
    async fn test_play_loops_track_at_low_volume() {
        // Arrange
        let media = Arc::new(GatedMedia::new());
        let music = BackgroundMusic::new(media.clone(), SoundSettings::default(), TRACK);

        // Act
        music.play();
        media.wait_for_plays(1).await;
        assert!(media.resolve(TRACK, Ok(())));
        media.wait_for_plays(2).await;

        // Assert
        let played = media.played();
        assert_eq!(played.len(), 2);
        assert!((played[0].volume - DEFAULT_VOLUME).abs() < f32::EPSILON);
        assert!(music.is_playing());

        music.stop();
    }

    #[tokio::test]
    async fn test_play_is_idempotent_while_running() {
        // Arrange
        let media = Arc::new(GatedMedia::new());
        let music = BackgroundMusic::new(media.clone(), SoundSettings::default(), TRACK);

        // Act
        music.play();
        music.play();
        media.wait_for_plays(1).await;
        tokio::task::yield_now().await;

        // Assert
        assert_eq!(media.pending_count(), 1);
        music.stop();
    }

    #[tokio::test]
    async fn test_stop_ends_loop() {
        // Arrange
        let media = Arc::new(GatedMedia::new());
        let music = BackgroundMusic::new(media.clone(), SoundSettings::default(), TRACK);
        music.play();
        media.wait_for_plays(1).await;

        // Act
        music.stop();

        // Assert
        assert!(!music.is_playing());
    }

    #[tokio::test]
    async fn test_media_error_ends_loop() {
        // Arrange
        let media = Arc::new(ScriptedMedia::failing(PlaybackError::Unreachable(
            "404".into(),
        )));
        let music = BackgroundMusic::new(media.clone(), SoundSettings::default(), TRACK);

        // Act
        music.play();
        media.wait_for_plays(1).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // Assert
        assert!(!music.is_playing());
        assert_eq!(media.played().len(), 1);
    }

    #[tokio::test]
    async fn test_muted_settings_hold_loop_until_unmuted() {
        // Arrange
        let media = Arc::new(GatedMedia::new());
        let settings = SoundSettings::new(true);
        let music = BackgroundMusic::new(media.clone(), settings.clone(), TRACK);

        // Act
        music.play();
        tokio::task::yield_now().await;
        assert!(media.played().is_empty());
        settings.set_muted(false);
        media.wait_for_plays(1).await;

        // Assert
        assert_eq!(media.played().len(), 1);
        music.stop();
    }
}
