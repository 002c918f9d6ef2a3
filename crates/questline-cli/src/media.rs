//! Media capability for hosts without an audio device.
//!
//! `HeadlessMedia` downloads the resource and treats the finished download as
//! the end of playback. That keeps reachability and timing observable while
//! the rest of the client runs unchanged.

use std::time::Duration;

use async_trait::async_trait;
use questline_core::error::PlaybackError;
use questline_core::media::{MediaPlayback, PlaybackRequest};
use reqwest::Client;
use tracing::debug;

/// Assumed encoding rate when pacing: 128 kbit/s MP3.
const PACED_BYTES_PER_SEC: u64 = 16_000;

/// Shortest simulated pass when pacing.
const MIN_PACED_DURATION: Duration = Duration::from_secs(1);

/// Fetches audio over HTTP instead of playing it.
#[derive(Debug, Clone)]
pub struct HeadlessMedia {
    client: Client,
    paced: bool,
}

impl HeadlessMedia {
    /// Creates headless media around `client` that resolves as soon as the
    /// download completes.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            paced: false,
        }
    }

    /// Also waits for the clip's estimated running time after downloading.
    /// Needed for looped tracks, which would otherwise refetch back to back.
    #[must_use]
    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }
}

fn estimated_duration(bytes: usize) -> Duration {
    let bytes = u64::try_from(bytes).unwrap_or(u64::MAX);
    Duration::from_secs(bytes / PACED_BYTES_PER_SEC).max(MIN_PACED_DURATION)
}

#[async_trait]
impl MediaPlayback for HeadlessMedia {
    async fn play(&self, request: PlaybackRequest) -> Result<(), PlaybackError> {
        let response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| PlaybackError::Unreachable(format!("{}: {e}", request.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::Unreachable(format!(
                "{} returned {status}",
                request.url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PlaybackError::Media(format!("{}: {e}", request.url)))?;
        debug!(url = %request.url, bytes = body.len(), volume = request.volume, "audio fetched");
        if self.paced {
            tokio::time::sleep(estimated_duration(body.len())).await;
        }
        Ok(())
    }
}
