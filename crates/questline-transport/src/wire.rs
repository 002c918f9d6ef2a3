//! Wire formats for the story server.
//!
//! Requests are form-encoded, responses are JSON. Field names are snake_case
//! on the wire and map one-to-one onto the core step model.

use questline_core::step::{Choice, Outcome, Step, StepId};
use serde::{Deserialize, Serialize};

/// Form body for `POST start_game`.
#[derive(Debug, Serialize)]
pub struct StartForm<'a> {
    /// Story theme.
    pub theme: &'a str,
    /// Session-establishing identifier.
    pub session_seed: &'a str,
}

/// Form body for `POST next_step`.
#[derive(Debug, Serialize)]
pub struct AdvanceForm<'a> {
    /// Session being played.
    pub session_id: &'a str,
    /// Step the choice was made on.
    pub current_step_id: &'a str,
    /// Zero-based choice index.
    pub choice_index: usize,
}

/// Form body for `POST restart_game`.
#[derive(Debug, Serialize)]
pub struct RestartForm<'a> {
    /// Session to restart.
    pub session_id: &'a str,
}

/// JSON body returned by `start_game`.
#[derive(Debug, Deserialize)]
pub struct StartEnvelope {
    /// Server-assigned session identifier.
    pub session_id: String,
    /// Opening step.
    pub step: StepPayload,
}

/// JSON body returned by `next_step` and `restart_game`.
#[derive(Debug, Deserialize)]
pub struct StepEnvelope {
    /// The step to install.
    pub step: StepPayload,
}

/// A choice as sent by the server. Extra fields (such as the target step id)
/// are ignored.
#[derive(Debug, Deserialize)]
pub struct ChoicePayload {
    /// Label shown to the player.
    pub text: String,
}

/// A step as sent by the server.
#[derive(Debug, Deserialize)]
pub struct StepPayload {
    /// Step identifier.
    pub id: String,
    /// Scene description.
    pub narration: String,
    /// Spoken rendition of the narration.
    #[serde(default)]
    pub narration_audio_url: Option<String>,
    /// Scene illustration.
    #[serde(alias = "scene_image")]
    pub scene_image_url: String,
    /// Character sheet illustration.
    #[serde(default, alias = "character_sheet")]
    pub character_sheet_url: Option<String>,
    /// Ordered options.
    #[serde(default)]
    pub choices: Vec<ChoicePayload>,
    /// Terminal flag.
    #[serde(default)]
    pub is_ending: bool,
    /// Ending outcome.
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

impl StepPayload {
    /// Converts into the core step, passing every resource locator through
    /// `resolve`.
    pub fn into_step(self, resolve: impl Fn(&str) -> String) -> Step {
        Step {
            id: StepId::new(self.id),
            narration: self.narration,
            narration_audio_url: self
                .narration_audio_url
                .filter(|url| !url.trim().is_empty())
                .map(|url| resolve(&url)),
            scene_image_url: resolve(&self.scene_image_url),
            character_sheet_url: self.character_sheet_url.map(|url| resolve(&url)),
            choices: self
                .choices
                .into_iter()
                .map(|choice| Choice::new(choice.text))
                .collect(),
            is_ending: self.is_ending,
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_payload_accepts_server_aliases_and_extra_fields() {
        let json = serde_json::json!({
            "id": "s0",
            "scene_description": "ignored",
            "narration": "Rain hammers the neon.",
            "scene_image": "static/games/g1/s0.png",
            "character_sheet": "static/games/g1/character_sheet.png",
            "choices": [{ "text": "Flee", "next_id": "s1" }, { "text": "Fight", "next_id": "s2" }],
            "is_ending": false,
            "outcome": null
        });

        let payload: StepPayload = serde_json::from_value(json).unwrap();
        let step = payload.into_step(|url| format!("http://host/{url}"));

        assert_eq!(step.id, StepId::new("s0"));
        assert_eq!(step.scene_image_url, "http://host/static/games/g1/s0.png");
        assert_eq!(
            step.character_sheet_url.as_deref(),
            Some("http://host/static/games/g1/character_sheet.png")
        );
        assert_eq!(step.choices, vec![Choice::new("Flee"), Choice::new("Fight")]);
        assert!(step.narration_audio_url.is_none());
    }

    #[test]
    fn test_blank_audio_url_means_no_narration_phase() {
        let json = serde_json::json!({
            "id": "s1",
            "narration": "Silence.",
            "narration_audio_url": "",
            "scene_image_url": "/s1.png",
            "is_ending": true,
            "outcome": "failure"
        });

        let payload: StepPayload = serde_json::from_value(json).unwrap();
        let step = payload.into_step(str::to_owned);

        assert!(step.narration_audio_url.is_none());
        assert!(step.choices.is_empty());
        assert_eq!(step.outcome, Some(Outcome::Failure));
    }
}
