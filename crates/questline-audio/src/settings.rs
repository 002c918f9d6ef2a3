//! Shared sound settings.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// The mute flag governing all playback.
///
/// Cloning shares the flag: every component built from clones of the same
/// `SoundSettings` observes the same mute state.
#[derive(Debug, Clone)]
pub struct SoundSettings {
    muted: Arc<watch::Sender<bool>>,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SoundSettings {
    /// Creates settings with the given initial mute state.
    #[must_use]
    pub fn new(muted: bool) -> Self {
        Self {
            muted: Arc::new(watch::channel(muted).0),
        }
    }

    /// Returns `true` while playback is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        *self.muted.borrow()
    }

    /// Sets the mute state.
    pub fn set_muted(&self, muted: bool) {
        self.muted.send_replace(muted);
        info!(muted, "sound settings changed");
    }

    /// Flips the mute state and returns the new value.
    pub fn toggle_mute(&self) -> bool {
        let mut muted = false;
        self.muted.send_modify(|value| {
            *value = !*value;
            muted = *value;
        });
        info!(muted, "sound settings changed");
        muted
    }

    /// Resolves once the mute state equals `muted`.
    pub async fn wait_until(&self, muted: bool) {
        let mut rx = self.muted.subscribe();
        let _ = rx.wait_for(|value| *value == muted).await;
    }
}
