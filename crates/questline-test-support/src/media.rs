//! Test media: mock `MediaPlayback` implementations for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use questline_core::error::PlaybackError;
use questline_core::media::{MediaPlayback, PlaybackRequest};
use tokio::sync::{oneshot, watch};

type PendingPlay = (String, oneshot::Sender<Result<(), PlaybackError>>);

/// A media capability that resolves every play immediately with a fixed
/// result and records each request.
#[derive(Debug)]
pub struct ScriptedMedia {
    result: Result<(), PlaybackError>,
    played: Mutex<Vec<PlaybackRequest>>,
    started: watch::Sender<usize>,
}

impl ScriptedMedia {
    /// Media where every play completes normally.
    #[must_use]
    pub fn completing() -> Self {
        Self::with_result(Ok(()))
    }

    /// Media where every play fails with `error`.
    #[must_use]
    pub fn failing(error: PlaybackError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<(), PlaybackError>) -> Self {
        Self {
            result,
            played: Mutex::new(Vec::new()),
            started: watch::channel(0).0,
        }
    }

    /// Returns a snapshot of all requests played so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn played(&self) -> Vec<PlaybackRequest> {
        self.played.lock().unwrap().clone()
    }

    /// Waits until at least `count` plays have started.
    pub async fn wait_for_plays(&self, count: usize) {
        let mut rx = self.started.subscribe();
        let _ = rx.wait_for(|started| *started >= count).await;
    }
}

#[async_trait]
impl MediaPlayback for ScriptedMedia {
    async fn play(&self, request: PlaybackRequest) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(request);
        self.started.send_modify(|started| *started += 1);
        self.result.clone()
    }
}

/// A media capability whose plays stay pending until the test resolves them.
///
/// Used to observe state while narration is still "playing".
#[derive(Debug)]
pub struct GatedMedia {
    pending: Mutex<VecDeque<PendingPlay>>,
    played: Mutex<Vec<PlaybackRequest>>,
    started: watch::Sender<usize>,
}

impl Default for GatedMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedMedia {
    /// Creates media with no pending plays.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            played: Mutex::new(Vec::new()),
            started: watch::channel(0).0,
        }
    }

    /// Returns a snapshot of all requests started so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn played(&self) -> Vec<PlaybackRequest> {
        self.played.lock().unwrap().clone()
    }

    /// Returns the number of plays still waiting for resolution.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Waits until at least `count` plays have started.
    pub async fn wait_for_plays(&self, count: usize) {
        let mut rx = self.started.subscribe();
        let _ = rx.wait_for(|started| *started >= count).await;
    }

    /// Resolves the oldest pending play for `url` with `result`. Returns
    /// `false` if no play for `url` is pending.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn resolve(&self, url: &str, result: Result<(), PlaybackError>) -> bool {
        let mut pending = self.pending.lock().unwrap();
        let Some(position) = pending.iter().position(|(pending_url, _)| pending_url == url) else {
            return false;
        };
        let Some((_, sender)) = pending.remove(position) else {
            return false;
        };
        // The player may already have given up on this play.
        let _ = sender.send(result);
        true
    }
}

#[async_trait]
impl MediaPlayback for GatedMedia {
    async fn play(&self, request: PlaybackRequest) -> Result<(), PlaybackError> {
        let (sender, receiver) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .push_back((request.url.clone(), sender));
        self.played.lock().unwrap().push(request);
        self.started.send_modify(|started| *started += 1);

        receiver
            .await
            .unwrap_or_else(|_| Err(PlaybackError::Media("playback abandoned".into())))
    }
}
