//! Questline — audio layer.
//!
//! Wraps the injected media capability with the playback policies the game
//! needs: bounded narration playback, random voice lines per category,
//! looping background music, and a single shared mute flag.

pub mod background;
pub mod narration;
pub mod settings;
pub mod voice_lines;

pub use background::BackgroundMusic;
pub use narration::{NarrationPlayer, PlaybackOutcome};
pub use settings::SoundSettings;
pub use voice_lines::{VoiceLineCategory, VoiceLineLibrary, VoiceLineSelector};
