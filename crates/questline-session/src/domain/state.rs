//! Controller lifecycle states.

use questline_core::step::Step;

/// Where the controller is in the interaction loop.
///
/// `Uninitialized → Loading → Ready(step) → Loading → … → Terminal(step)`,
/// with `Errored` reachable from any `Loading` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been requested yet.
    Uninitialized,
    /// A round-trip is outstanding.
    Loading,
    /// A non-ending step is installed.
    Ready(Step),
    /// An ending step is installed.
    Terminal(Step),
    /// The last attempt failed; only a fresh start recovers.
    Errored {
        /// Diagnostic detail for logs. Never shown to the player.
        reason: String,
    },
}

impl SessionState {
    /// The state a freshly received step puts the controller in.
    #[must_use]
    pub fn for_step(step: Step) -> Self {
        if step.is_ending {
            Self::Terminal(step)
        } else {
            Self::Ready(step)
        }
    }

    /// Short name for logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Terminal(_) => "terminal",
            Self::Errored { .. } => "errored",
        }
    }

    /// The installed step, if any.
    #[must_use]
    pub fn step(&self) -> Option<&Step> {
        match self {
            Self::Ready(step) | Self::Terminal(step) => Some(step),
            _ => None,
        }
    }
}
