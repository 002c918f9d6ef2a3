//! Commands accepted by the session controller.
//!
//! Every public controller operation is turned into one of these before it
//! touches state, so each round-trip is logged under a single correlation ID.

use uuid::Uuid;

/// A controller operation with tracing metadata.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted name used in log records.
    fn command_type(&self) -> &'static str;

    /// ID shared by every log record of one operation.
    fn correlation_id(&self) -> Uuid;
}

/// Command to open a new session.
#[derive(Debug, Clone)]
pub struct StartGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Requested theme, unvalidated.
    pub theme: String,
    /// Session-establishing identifier, unvalidated.
    pub session_seed: String,
}

impl StartGame {
    /// Creates the command with a fresh correlation ID.
    #[must_use]
    pub fn new(theme: &str, session_seed: &str) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            theme: theme.to_owned(),
            session_seed: session_seed.to_owned(),
        }
    }
}

impl Command for StartGame {
    fn command_type(&self) -> &'static str {
        "session.start_game"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to pick one of the current step's choices.
#[derive(Debug, Clone)]
pub struct SelectChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Zero-based index into the current step's choices.
    pub choice_index: usize,
}

impl SelectChoice {
    /// Creates the command with a fresh correlation ID.
    #[must_use]
    pub fn new(choice_index: usize) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            choice_index,
        }
    }
}

impl Command for SelectChoice {
    fn command_type(&self) -> &'static str {
        "session.select_choice"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to restart a failed run.
#[derive(Debug, Clone)]
pub struct RestartGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl RestartGame {
    /// Creates the command with a fresh correlation ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
        }
    }
}

impl Default for RestartGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for RestartGame {
    fn command_type(&self) -> &'static str {
        "session.restart_game"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_command_gets_its_own_correlation_id() {
        let first = SelectChoice::new(0);
        let second = SelectChoice::new(0);

        assert_ne!(first.correlation_id(), second.correlation_id());
        assert_eq!(first.command_type(), "session.select_choice");
    }

    #[test]
    fn test_start_game_keeps_raw_input_for_validation() {
        let command = StartGame::new("  ", "seed");

        assert_eq!(command.theme, "  ");
        assert_eq!(command.command_type(), "session.start_game");
        assert_eq!(RestartGame::default().command_type(), "session.restart_game");
    }
}
