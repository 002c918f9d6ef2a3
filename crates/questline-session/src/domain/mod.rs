//! Domain layer: the synchronous state machine and its read models.

pub mod commands;
pub mod session;
pub mod state;
pub mod view;
