//! Read models handed to the display layer.

use questline_core::step::{Choice, Outcome, Step, StepId};

/// Message shown whenever the controller is errored.
pub const LOAD_FAILURE_MESSAGE: &str = "Could not load game data.";

/// A non-ending step as the player sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneView {
    /// Installed step.
    pub step_id: StepId,
    /// Scene description, shown immediately.
    pub narration: String,
    /// Scene illustration, shown immediately.
    pub scene_image_url: String,
    /// Character sheet illustration.
    pub character_sheet_url: Option<String>,
    /// Choice labels in order.
    pub choices: Vec<Choice>,
    /// `false` while narration audio is playing.
    pub choices_enabled: bool,
}

impl SceneView {
    /// A non-ending step with nothing to pick.
    #[must_use]
    pub fn is_dead_end(&self) -> bool {
        self.choices.is_empty()
    }
}

/// An ending as the player sees it. Never carries choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndingView {
    /// Installed step.
    pub step_id: StepId,
    /// Closing narration.
    pub narration: String,
    /// Scene illustration.
    pub scene_image_url: String,
    /// Character sheet illustration.
    pub character_sheet_url: Option<String>,
    /// How the story ended.
    pub outcome: Option<Outcome>,
    /// Whether `restart` is offered.
    pub can_restart: bool,
}

/// Snapshot of everything the display layer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    /// Nothing requested yet.
    Uninitialized,
    /// Waiting on the server.
    Loading,
    /// A playable step.
    Playing(SceneView),
    /// An ending.
    Ended(EndingView),
    /// The last attempt failed.
    Errored {
        /// Player-facing message.
        message: String,
    },
}

impl SessionView {
    /// A playing scene whose choices are still withheld.
    #[must_use]
    pub fn is_narrating(&self) -> bool {
        matches!(self, Self::Playing(scene) if !scene.choices_enabled)
    }

    pub(crate) fn scene(step: &Step, narrating: bool) -> Self {
        Self::Playing(SceneView {
            step_id: step.id.clone(),
            narration: step.narration.clone(),
            scene_image_url: step.scene_image_url.clone(),
            character_sheet_url: step.character_sheet_url.clone(),
            choices: step.choices.clone(),
            choices_enabled: !narrating,
        })
    }

    pub(crate) fn ending(step: &Step) -> Self {
        let outcome = step.ending_outcome();
        Self::Ended(EndingView {
            step_id: step.id.clone(),
            narration: step.narration.clone(),
            scene_image_url: step.scene_image_url.clone(),
            character_sheet_url: step.character_sheet_url.clone(),
            outcome,
            can_restart: outcome == Some(Outcome::Failure),
        })
    }

    pub(crate) fn errored() -> Self {
        Self::Errored {
            message: LOAD_FAILURE_MESSAGE.to_owned(),
        }
    }
}
