//! Step fixtures.

use questline_core::step::{Choice, Outcome, Step, StepId};

/// A non-ending step without narration audio.
#[must_use]
pub fn plain_step(id: &str, choices: &[&str]) -> Step {
    Step {
        id: StepId::new(id),
        narration: format!("Narration for {id}."),
        narration_audio_url: None,
        scene_image_url: format!("http://localhost/static/{id}.png"),
        character_sheet_url: None,
        choices: choices.iter().map(|text| Choice::new(*text)).collect(),
        is_ending: false,
        outcome: None,
    }
}

/// A non-ending step whose narration has a spoken rendition at `audio_url`.
#[must_use]
pub fn narrated_step(id: &str, audio_url: &str, choices: &[&str]) -> Step {
    Step {
        narration_audio_url: Some(audio_url.to_owned()),
        ..plain_step(id, choices)
    }
}

/// A terminal step with the given outcome and no narration audio.
#[must_use]
pub fn ending_step(id: &str, outcome: Outcome, narration: &str) -> Step {
    Step {
        narration: narration.to_owned(),
        is_ending: true,
        outcome: Some(outcome),
        ..plain_step(id, &[])
    }
}
