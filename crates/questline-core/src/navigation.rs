//! Navigation handoff.

/// The screen flow that owns character creation.
///
/// The controller is entered with a `{theme, session_seed}` pair and hands
/// control back through this trait when the player asks for a new game.
pub trait Navigator: Send + Sync {
    /// Leaves the game screen and reopens character creation.
    fn return_to_character_creation(&self);
}
