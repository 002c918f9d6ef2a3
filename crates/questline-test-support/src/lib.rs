//! Shared test mocks and utilities for the Questline game client.

mod fixtures;
mod media;
mod navigator;
mod rng;
mod transport;

pub use fixtures::{ending_step, narrated_step, plain_step};
pub use media::{GatedMedia, ScriptedMedia};
pub use navigator::RecordingNavigator;
pub use rng::{MockRng, SequenceRng};
pub use transport::{FailingTransport, RecordingTransport, TransportCall};
