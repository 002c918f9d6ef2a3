//! Questline Core — shared domain types and capability traits.
//!
//! This crate defines the step model every other crate speaks, the error
//! taxonomy, and the traits behind which the outside world (server, audio
//! device, navigation, randomness) is injected. It contains no I/O.

pub mod error;
pub mod media;
pub mod navigation;
pub mod rng;
pub mod step;
pub mod theme;
pub mod transport;
