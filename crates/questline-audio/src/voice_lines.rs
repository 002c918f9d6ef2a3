//! Voice-line selector.
//!
//! Voice lines are short reaction clips grouped by category. Each call picks
//! one clip uniformly at random from the category's pool. Playback is always
//! best-effort: failures are logged by the narration player and never reach
//! the caller's control flow.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use questline_core::rng::DeterministicRng;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::narration::{NarrationPlayer, PlaybackOutcome};

/// Category of a voice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceLineCategory {
    /// Greeting on the title screen.
    Welcome,
    /// Reaction to a player choice.
    Comment,
    /// Reaction to a good ending.
    Success,
    /// Reaction to a bad ending.
    Failure,
}

impl VoiceLineCategory {
    /// All categories.
    pub const ALL: [Self; 4] = [Self::Welcome, Self::Comment, Self::Success, Self::Failure];

    /// Lowercase category name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Comment => "comment",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for VoiceLineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed clip pools, one per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceLineLibrary {
    pools: HashMap<VoiceLineCategory, Vec<String>>,
}

impl Default for VoiceLineLibrary {
    /// The clips shipped with the game server under `/static/audio`.
    fn default() -> Self {
        let pool = |stem: &str, count: usize| -> Vec<String> {
            (1..=count)
                .map(|n| format!("/static/audio/{stem}_{n:02}.mp3"))
                .collect()
        };

        Self::empty()
            .with_pool(VoiceLineCategory::Welcome, pool("welcome", 3))
            .with_pool(VoiceLineCategory::Comment, pool("comments", 4))
            .with_pool(VoiceLineCategory::Success, pool("success", 3))
            .with_pool(VoiceLineCategory::Failure, pool("failure", 3))
    }
}

impl VoiceLineLibrary {
    /// A library with no clips in any category.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    /// Replaces the pool for `category`.
    #[must_use]
    pub fn with_pool(mut self, category: VoiceLineCategory, clips: Vec<String>) -> Self {
        self.pools.insert(category, clips);
        self
    }

    /// Returns the clips registered for `category`.
    #[must_use]
    pub fn pool(&self, category: VoiceLineCategory) -> &[String] {
        self.pools
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rewrites every clip locator through `resolve`.
    #[must_use]
    pub fn map_urls(mut self, resolve: impl Fn(&str) -> String) -> Self {
        for clips in self.pools.values_mut() {
            for clip in clips.iter_mut() {
                *clip = resolve(clip);
            }
        }
        self
    }
}

/// Plays a random clip from a category through the narration player.
#[derive(Clone)]
pub struct VoiceLineSelector {
    player: NarrationPlayer,
    library: Arc<VoiceLineLibrary>,
    rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl fmt::Debug for VoiceLineSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceLineSelector")
            .field("player", &self.player)
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}

impl VoiceLineSelector {
    /// Creates a selector drawing from `library` with `rng`.
    #[must_use]
    pub fn new(
        player: NarrationPlayer,
        library: VoiceLineLibrary,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self {
            player,
            library: Arc::new(library),
            rng,
        }
    }

    /// Picks a clip for `category`, or `None` when the pool is empty.
    #[must_use]
    pub fn pick(&self, category: VoiceLineCategory) -> Option<String> {
        let pool = self.library.pool(category);
        let last_index = pool.len().checked_sub(1)?;
        let last = u32::try_from(last_index).unwrap_or(u32::MAX);
        let drawn = match self.rng.lock() {
            Ok(mut rng) => rng.next_u32_range(0, last),
            Err(poisoned) => poisoned.into_inner().next_u32_range(0, last),
        };
        // An out-of-range draw lands on the last clip.
        let index = usize::try_from(drawn).map_or(last_index, |index| index.min(last_index));
        pool.get(index).cloned()
    }

    /// Plays a random clip for `category` and waits for it to finish.
    pub async fn play_random(&self, category: VoiceLineCategory) -> PlaybackOutcome {
        if self.player.settings().is_muted() {
            return PlaybackOutcome::Skipped;
        }
        let Some(url) = self.pick(category) else {
            warn!(%category, "no voice lines registered");
            return PlaybackOutcome::Skipped;
        };

        debug!(%category, url = %url, "playing voice line");
        self.player.play(&url).await
    }

    /// Plays a random clip for `category` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_random(&self, category: VoiceLineCategory) -> JoinHandle<PlaybackOutcome> {
        let selector = self.clone();
        tokio::spawn(async move { selector.play_random(category).await })
    }
}
