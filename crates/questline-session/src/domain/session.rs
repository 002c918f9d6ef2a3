//! The game session state machine.
//!
//! `GameSession` is synchronous and owns all mutable session state. Every
//! round-trip is started with a `begin_*` call that validates the caller's
//! input, moves to `Loading`, and hands out a [`Ticket`]. Results are applied
//! with that ticket; a ticket from an earlier generation, or any ticket after
//! disposal, is refused so late results can never touch torn-down state.

use questline_core::step::{Outcome, SessionId, Step};
use questline_core::theme::Theme;
use questline_core::transport::{AdvanceRequest, RestartSessionRequest, StartSessionRequest};

use super::commands::{SelectChoice, StartGame};
use super::state::SessionState;
use super::view::SessionView;
use crate::error::SessionError;

/// Proof that a round-trip was started in a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Follow-up work after a step was installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    /// Ticket the narration result must be reported with.
    pub ticket: Ticket,
    /// Narration to play; the gate is closed until it resolves.
    pub narration_audio_url: Option<String>,
    /// Set when the installed step is an ending with a known outcome.
    pub ending: Option<Outcome>,
}

/// The session state machine.
#[derive(Debug)]
pub struct GameSession {
    state: SessionState,
    session_id: Option<SessionId>,
    playback_gate: bool,
    generation: u64,
    disposed: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates an uninitialized session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            session_id: None,
            playback_gate: false,
            generation: 0,
            disposed: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Server-assigned session identifier, once a start succeeded.
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// `true` while narration for the installed step is playing.
    #[must_use]
    pub fn playback_gate(&self) -> bool {
        self.playback_gate
    }

    /// `true` once the session was torn down.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Builds the display snapshot for the current state.
    #[must_use]
    pub fn view(&self) -> SessionView {
        match &self.state {
            SessionState::Uninitialized => SessionView::Uninitialized,
            SessionState::Loading => SessionView::Loading,
            SessionState::Ready(step) => SessionView::scene(step, self.playback_gate),
            SessionState::Terminal(step) => SessionView::ending(step),
            SessionState::Errored { .. } => SessionView::errored(),
        }
    }

    /// Validates a start and enters `Loading`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CallerContract` for a blank theme or seed, in
    /// which case the session is left `Errored`. Returns `Busy` while
    /// loading and `Disposed` after teardown; neither changes state.
    pub fn begin_start(
        &mut self,
        command: &StartGame,
    ) -> Result<(Ticket, StartSessionRequest), SessionError> {
        self.ensure_idle()?;

        let Some(theme) = Theme::parse(&command.theme) else {
            return Err(self.reject_input("theme is required"));
        };
        let session_seed = command.session_seed.trim();
        if session_seed.is_empty() {
            return Err(self.reject_input("session seed is required"));
        }

        let request = StartSessionRequest {
            theme: theme.as_str().to_owned(),
            session_seed: session_seed.to_owned(),
        };
        self.session_id = None;
        Ok((self.begin_loading(), request))
    }

    /// Validates a choice and enters `Loading`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` outside `Ready`, `NarrationInProgress` while the
    /// gate is closed, and `CallerContract` for an index outside the current
    /// choices. None of these change state.
    pub fn begin_advance(
        &mut self,
        command: &SelectChoice,
    ) -> Result<(Ticket, AdvanceRequest), SessionError> {
        self.ensure_idle()?;

        let SessionState::Ready(step) = &self.state else {
            return Err(self.invalid("select_choice"));
        };
        if self.playback_gate {
            return Err(SessionError::NarrationInProgress);
        }
        let index = command.choice_index;
        if !step.has_choice(index) {
            return Err(SessionError::CallerContract(format!(
                "choice index {index} is out of range for {} choices",
                step.choices.len()
            )));
        }
        let Some(session_id) = self.session_id.clone() else {
            return Err(self.invalid("select_choice"));
        };

        let request = AdvanceRequest {
            session_id,
            current_step_id: step.id.clone(),
            choice_index: index,
        };
        Ok((self.begin_loading(), request))
    }

    /// Validates a restart and enters `Loading`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is `Terminal` with a failure
    /// outcome.
    pub fn begin_restart(&mut self) -> Result<(Ticket, RestartSessionRequest), SessionError> {
        self.ensure_idle()?;

        let failed = matches!(
            &self.state,
            SessionState::Terminal(step) if step.ending_outcome() == Some(Outcome::Failure)
        );
        if !failed {
            return Err(self.invalid("restart"));
        }
        let Some(session_id) = self.session_id.clone() else {
            return Err(self.invalid("restart"));
        };

        Ok((self.begin_loading(), RestartSessionRequest { session_id }))
    }

    /// Validates the handoff back to character creation and disposes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is `Terminal` or `Errored`.
    pub fn begin_new_game(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        if !matches!(
            self.state,
            SessionState::Terminal(_) | SessionState::Errored { .. }
        ) {
            return Err(self.invalid("start_new_game"));
        }
        self.dispose();
        Ok(())
    }

    /// Installs a step received for `ticket`. Returns `None` if the ticket is
    /// stale, in which case nothing changes.
    pub fn install(
        &mut self,
        ticket: Ticket,
        session_id: Option<SessionId>,
        step: Step,
    ) -> Option<Installed> {
        if !self.accepts(ticket) {
            return None;
        }
        if let Some(session_id) = session_id {
            self.session_id = Some(session_id);
        }

        let installed = Installed {
            ticket,
            narration_audio_url: step.narration_audio_url.clone(),
            ending: step.ending_outcome(),
        };
        self.playback_gate = installed.narration_audio_url.is_some();
        self.state = SessionState::for_step(step);
        Some(installed)
    }

    /// Records a failed round-trip for `ticket`. Returns `false` if the
    /// ticket is stale.
    pub fn fail(&mut self, ticket: Ticket, reason: String) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.playback_gate = false;
        self.state = SessionState::Errored { reason };
        true
    }

    /// Opens the gate once narration for `ticket` resolved. Returns `false`
    /// if a newer step was installed meanwhile or the session was disposed.
    pub fn finish_narration(&mut self, ticket: Ticket) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.playback_gate = false;
        true
    }

    /// Tears the session down. Later results are all refused; the last
    /// installed view, gate included, stays as it was.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.generation += 1;
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        !self.disposed && ticket.0 == self.generation
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.disposed {
            return Err(SessionError::Disposed);
        }
        if self.state == SessionState::Loading {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    fn begin_loading(&mut self) -> Ticket {
        self.generation += 1;
        self.playback_gate = false;
        self.state = SessionState::Loading;
        Ticket(self.generation)
    }

    fn reject_input(&mut self, reason: &str) -> SessionError {
        self.generation += 1;
        self.playback_gate = false;
        self.state = SessionState::Errored {
            reason: reason.to_owned(),
        };
        SessionError::CallerContract(reason.to_owned())
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            state: self.state.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_core::step::StepId;
    use questline_test_support::{ending_step, narrated_step, plain_step};

    fn started(step: Step) -> (GameSession, Installed) {
        let mut session = GameSession::new();
        let (ticket, _) = session
            .begin_start(&StartGame::new("Cyberpunk Underworld", "seed-1"))
            .unwrap();
        let installed = session
            .install(ticket, Some(SessionId::new("g1")), step)
            .unwrap();
        (session, installed)
    }

    #[test]
    fn test_begin_start_with_blank_theme_errors_without_request() {
        // Arrange
        let mut session = GameSession::new();

        // Act
        let result = session.begin_start(&StartGame::new("  ", "seed-1"));

        // Assert
        assert!(matches!(result, Err(SessionError::CallerContract(_))));
        assert_eq!(session.state().name(), "errored");
    }

    #[test]
    fn test_begin_start_with_blank_seed_errors_without_request() {
        let mut session = GameSession::new();

        let result = session.begin_start(&StartGame::new("Cyberpunk Underworld", ""));

        assert!(matches!(result, Err(SessionError::CallerContract(_))));
        assert_eq!(session.view(), SessionView::errored());
    }

    #[test]
    fn test_begin_start_trims_inputs_and_enters_loading() {
        // Arrange
        let mut session = GameSession::new();

        // Act
        let (_, request) = session
            .begin_start(&StartGame::new(" Cyberpunk Underworld ", " seed-1 "))
            .unwrap();

        // Assert
        assert_eq!(request.theme, "Cyberpunk Underworld");
        assert_eq!(request.session_seed, "seed-1");
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn test_operations_while_loading_are_busy() {
        // Arrange
        let mut session = GameSession::new();
        session
            .begin_start(&StartGame::new("Cyberpunk Underworld", "seed-1"))
            .unwrap();

        // Act / Assert
        assert_eq!(
            session
                .begin_start(&StartGame::new("Cyberpunk Underworld", "seed-2"))
                .unwrap_err(),
            SessionError::Busy
        );
        assert_eq!(
            session.begin_advance(&SelectChoice::new(0)).unwrap_err(),
            SessionError::Busy
        );
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn test_install_with_audio_closes_gate() {
        let (session, installed) = started(narrated_step("s0", "http://a/s0.mp3", &["Flee"]));

        assert!(session.playback_gate());
        assert_eq!(
            installed.narration_audio_url.as_deref(),
            Some("http://a/s0.mp3")
        );
        assert!(session.view().is_narrating());
    }

    #[test]
    fn test_install_without_audio_leaves_choices_enabled() {
        let (session, installed) = started(plain_step("s0", &["Flee", "Fight"]));

        assert!(!session.playback_gate());
        assert!(installed.narration_audio_url.is_none());
        match session.view() {
            SessionView::Playing(scene) => {
                assert!(scene.choices_enabled);
                assert_eq!(scene.choices.len(), 2);
            }
            other => panic!("expected Playing, got {other:?}"),
        }
    }

    #[test]
    fn test_begin_advance_rejected_while_gate_closed() {
        // Arrange
        let (mut session, _) = started(narrated_step("s0", "http://a/s0.mp3", &["Flee"]));

        // Act
        let result = session.begin_advance(&SelectChoice::new(0));

        // Assert
        assert_eq!(result.unwrap_err(), SessionError::NarrationInProgress);
        assert_eq!(session.state().name(), "ready");
    }

    #[test]
    fn test_begin_advance_out_of_range_leaves_state_untouched() {
        // Arrange
        let (mut session, _) = started(plain_step("s0", &["Flee", "Fight"]));
        let before = session.view();

        // Act
        let result = session.begin_advance(&SelectChoice::new(2));

        // Assert
        assert!(matches!(result, Err(SessionError::CallerContract(_))));
        assert_eq!(session.view(), before);
    }

    #[test]
    fn test_dead_end_step_is_representable() {
        // Arrange
        let (mut session, _) = started(plain_step("s3", &[]));

        // Act
        let result = session.begin_advance(&SelectChoice::new(0));

        // Assert
        assert!(matches!(result, Err(SessionError::CallerContract(_))));
        match session.view() {
            SessionView::Playing(scene) => assert!(scene.is_dead_end()),
            other => panic!("expected Playing, got {other:?}"),
        }
    }

    #[test]
    fn test_begin_advance_builds_request_from_current_step() {
        // Arrange
        let (mut session, _) = started(plain_step("s0", &["Flee", "Fight"]));

        // Act
        let (_, request) = session.begin_advance(&SelectChoice::new(1)).unwrap();

        // Assert
        assert_eq!(request.session_id, SessionId::new("g1"));
        assert_eq!(request.current_step_id, StepId::new("s0"));
        assert_eq!(request.choice_index, 1);
    }

    #[test]
    fn test_finish_narration_ignores_stale_ticket() {
        // Arrange
        let (mut session, first) = started(narrated_step("s0", "http://a/s0.mp3", &["Flee"]));
        session.finish_narration(first.ticket);
        let (ticket, _) = session.begin_advance(&SelectChoice::new(0)).unwrap();
        session
            .install(ticket, None, narrated_step("s1", "http://a/s1.mp3", &["On"]))
            .unwrap();

        // Act
        let applied = session.finish_narration(first.ticket);

        // Assert
        assert!(!applied);
        assert!(session.playback_gate());
    }

    #[test]
    fn test_terminal_step_hides_choices_even_when_present() {
        // Arrange
        let mut step = ending_step("s9", Outcome::Failure, "You perished.");
        step.choices = plain_step("x", &["Ghost option"]).choices;

        // Act
        let (session, installed) = started(step);

        // Assert
        assert_eq!(installed.ending, Some(Outcome::Failure));
        match session.view() {
            SessionView::Ended(ending) => {
                assert_eq!(ending.outcome, Some(Outcome::Failure));
                assert!(ending.can_restart);
            }
            other => panic!("expected Ended, got {other:?}"),
        }
    }

    #[test]
    fn test_restart_rejected_outside_failed_ending() {
        let (mut ready, _) = started(plain_step("s0", &["Flee"]));
        assert!(matches!(
            ready.begin_restart(),
            Err(SessionError::InvalidState { operation: "restart", state: "ready" })
        ));

        let (mut won, _) = started(ending_step("s5", Outcome::Success, "You escaped."));
        assert!(matches!(
            won.begin_restart(),
            Err(SessionError::InvalidState { operation: "restart", state: "terminal" })
        ));
        assert!(!matches!(won.view(), SessionView::Ended(ref e) if e.can_restart));
    }

    #[test]
    fn test_restart_allowed_after_failed_ending() {
        let (mut session, _) = started(ending_step("s9", Outcome::Failure, "You perished."));

        let (_, request) = session.begin_restart().unwrap();

        assert_eq!(request.session_id, SessionId::new("g1"));
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn test_dispose_refuses_late_results() {
        // Arrange
        let mut session = GameSession::new();
        let (ticket, _) = session
            .begin_start(&StartGame::new("Cyberpunk Underworld", "seed-1"))
            .unwrap();

        // Act
        session.dispose();

        // Assert
        assert!(session.install(ticket, None, plain_step("s0", &[])).is_none());
        assert!(!session.fail(ticket, "late".to_owned()));
        assert_eq!(
            session.begin_advance(&SelectChoice::new(0)).unwrap_err(),
            SessionError::Disposed
        );
    }

    #[test]
    fn test_dispose_mid_narration_leaves_view_unchanged() {
        // Arrange
        let (mut session, installed) = started(narrated_step("s0", "http://a/s0.mp3", &["Flee"]));
        let before = session.view();

        // Act
        session.dispose();

        // Assert
        assert!(!session.finish_narration(installed.ticket));
        assert!(session.playback_gate());
        assert_eq!(session.view(), before);
        assert!(session.view().is_narrating());
    }

    #[test]
    fn test_begin_new_game_only_from_terminal_or_errored() {
        let (mut ready, _) = started(plain_step("s0", &["Flee"]));
        assert!(ready.begin_new_game().is_err());
        assert!(!ready.is_disposed());

        let (mut ended, _) = started(ending_step("s5", Outcome::Success, "You escaped."));
        ended.begin_new_game().unwrap();
        assert!(ended.is_disposed());
    }
}
