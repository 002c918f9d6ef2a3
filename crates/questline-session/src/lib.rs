//! Questline — game session controller.
//!
//! Owns the current step, drives the start / advance / restart round-trips,
//! and withholds choice selection while a step's narration is playing.

pub mod application;
pub mod domain;
pub mod error;

pub use application::controller::{ControllerParts, GameSessionController};
pub use domain::view::{EndingView, SceneView, SessionView};
pub use error::SessionError;
