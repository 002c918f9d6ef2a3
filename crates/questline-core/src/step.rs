//! The step model: one unit of narrative state returned by the server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned identifier scoping one playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw session token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a step within a story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Wraps a raw step identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a terminal step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The player reached a good ending.
    Success,
    /// The player reached a bad ending; the run may be restarted.
    Failure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
        }
    }
}

/// A single option the player can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Label shown to the player.
    pub text: String,
}

impl Choice {
    /// Creates a choice with the given label.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One unit of narrative state.
///
/// A non-ending step with no choices is a valid dead end: nothing can be
/// selected from it, but it is displayed like any other step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Identifier required to request the next step.
    pub id: StepId,
    /// Scene description.
    pub narration: String,
    /// Spoken rendition of the narration, if any.
    pub narration_audio_url: Option<String>,
    /// Accompanying illustration.
    pub scene_image_url: String,
    /// Generated character sheet shown alongside the scene.
    pub character_sheet_url: Option<String>,
    /// Ordered options; may be empty.
    pub choices: Vec<Choice>,
    /// Whether this step ends the story.
    pub is_ending: bool,
    /// Ending outcome, meaningful only when `is_ending` is set.
    pub outcome: Option<Outcome>,
}

impl Step {
    /// Returns the ending outcome, or `None` for non-terminal steps.
    #[must_use]
    pub fn ending_outcome(&self) -> Option<Outcome> {
        if self.is_ending { self.outcome } else { None }
    }

    /// Returns `true` when `index` addresses one of this step's choices.
    #[must_use]
    pub fn has_choice(&self, index: usize) -> bool {
        !self.is_ending && index < self.choices.len()
    }
}
