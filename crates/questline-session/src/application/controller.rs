//! The game session controller.
//!
//! Wraps the synchronous [`GameSession`] in a mutex and drives it through the
//! injected transport, narration and navigation capabilities. The mutex is
//! never held across an `.await`; every round-trip is bracketed by a
//! `begin_*` call and a ticketed result so late answers cannot land after a
//! newer load or after disposal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use questline_audio::{NarrationPlayer, PlaybackOutcome, VoiceLineCategory, VoiceLineSelector};
use questline_core::error::TransportError;
use questline_core::navigation::Navigator;
use questline_core::step::{Outcome, SessionId, Step};
use questline_core::transport::SessionTransport;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::domain::commands::{Command, RestartGame, SelectChoice, StartGame};
use crate::domain::session::{GameSession, Installed, Ticket};
use crate::domain::state::SessionState;
use crate::domain::view::SessionView;
use crate::error::SessionError;

/// Capabilities the controller is built from.
pub struct ControllerParts {
    /// Server round-trips.
    pub transport: Arc<dyn SessionTransport>,
    /// Plays step narration.
    pub player: NarrationPlayer,
    /// Plays comment and outcome voice lines.
    pub voice_lines: VoiceLineSelector,
    /// Leaves the game screen.
    pub navigator: Arc<dyn Navigator>,
}

struct Inner {
    session: Mutex<GameSession>,
    transport: Arc<dyn SessionTransport>,
    player: NarrationPlayer,
    voice_lines: VoiceLineSelector,
    navigator: Arc<dyn Navigator>,
    updates: watch::Sender<SessionView>,
}

/// Drives one game screen from character creation to an ending.
pub struct GameSessionController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for GameSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSessionController")
            .field("session", &*self.inner.session())
            .finish_non_exhaustive()
    }
}

impl GameSessionController {
    /// Creates an uninitialized controller.
    #[must_use]
    pub fn new(parts: ControllerParts) -> Self {
        let (updates, _) = watch::channel(SessionView::Uninitialized);
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(GameSession::new()),
                transport: parts.transport,
                player: parts.player,
                voice_lines: parts.voice_lines,
                navigator: parts.navigator,
                updates,
            }),
        }
    }

    /// Opens a new session with `theme` and `session_seed`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CallerContract` for blank input (the controller
    /// becomes errored), `Busy` while loading, `Transport` when the server
    /// round-trip fails, and `Disposed` after teardown.
    pub async fn start(
        &self,
        theme: &str,
        session_seed: &str,
    ) -> Result<SessionView, SessionError> {
        self.run_start(&StartGame::new(theme, session_seed)).await
    }

    /// Picks choice `index` of the current step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NarrationInProgress` while the gate is closed,
    /// `CallerContract` for an index outside the current choices,
    /// `InvalidState` outside `Ready`, and `Transport` when the round-trip
    /// fails.
    pub async fn select_choice(&self, index: usize) -> Result<SessionView, SessionError> {
        self.run_select_choice(&SelectChoice::new(index)).await
    }

    /// Restarts a failed run from its first step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the installed step is a
    /// failed ending, and `Transport` when the round-trip fails.
    pub async fn restart(&self) -> Result<SessionView, SessionError> {
        self.run_restart(&RestartGame::new()).await
    }

    /// Disposes the controller and hands control back to character creation.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the session ended or
    /// errored.
    pub fn start_new_game(&self) -> Result<(), SessionError> {
        {
            let mut session = self.inner.session();
            session.begin_new_game()?;
        }
        info!("returning to character creation");
        self.inner.navigator.return_to_character_creation();
        Ok(())
    }

    /// Tears the controller down. In-flight results and narration completions
    /// are discarded from here on.
    pub fn dispose(&self) {
        let mut session = self.inner.session();
        if !session.is_disposed() {
            session.dispose();
            info!("session controller disposed");
        }
    }

    /// Snapshot for display.
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.inner.session().view()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.session().state().clone()
    }

    /// Server-assigned session id, once a start succeeded.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.inner.session().session_id().cloned()
    }

    /// Receiver updated on every view change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.updates.subscribe()
    }

    /// Waits until the current step's narration has resolved.
    pub async fn wait_for_choices(&self) {
        let mut updates = self.subscribe();
        let _ = updates.wait_for(|view| !view.is_narrating()).await;
    }

    #[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
    async fn run_start(&self, command: &StartGame) -> Result<SessionView, SessionError> {
        let (ticket, request) = {
            let mut session = self.inner.session();
            let begun = session.begin_start(command);
            self.inner.publish(&session);
            begun?
        };

        info!(
            command = command.command_type(),
            theme = %request.theme,
            "starting session"
        );
        match self.inner.transport.start_session(request).await {
            Ok(response) => self.inner.install(ticket, Some(response.session_id), response.step),
            Err(error) => self.inner.fail(ticket, error),
        }
    }

    #[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
    async fn run_select_choice(&self, command: &SelectChoice) -> Result<SessionView, SessionError> {
        let (ticket, request) = {
            let mut session = self.inner.session();
            let begun = session.begin_advance(command);
            self.inner.publish(&session);
            begun?
        };

        info!(
            command = command.command_type(),
            session_id = %request.session_id,
            step_id = %request.current_step_id,
            choice_index = request.choice_index,
            "advancing"
        );
        self.inner.voice_lines.spawn_random(VoiceLineCategory::Comment);
        match self.inner.transport.advance(request).await {
            Ok(response) => self.inner.install(ticket, None, response.step),
            Err(error) => self.inner.fail(ticket, error),
        }
    }

    #[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
    async fn run_restart(&self, command: &RestartGame) -> Result<SessionView, SessionError> {
        let (ticket, request) = {
            let mut session = self.inner.session();
            let begun = session.begin_restart();
            self.inner.publish(&session);
            begun?
        };

        info!(
            command = command.command_type(),
            session_id = %request.session_id,
            "restarting session"
        );
        match self.inner.transport.restart_session(request).await {
            Ok(response) => self.inner.install(ticket, None, response.step),
            Err(error) => self.inner.fail(ticket, error),
        }
    }
}

impl Inner {
    fn session(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, session: &GameSession) {
        let view = session.view();
        self.updates.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    fn install(
        self: &Arc<Self>,
        ticket: Ticket,
        session_id: Option<SessionId>,
        step: Step,
    ) -> Result<SessionView, SessionError> {
        let step_id = step.id.clone();
        let (installed, view) = {
            let mut session = self.session();
            let Some(installed) = session.install(ticket, session_id, step) else {
                debug!(step_id = %step_id, "discarding step for a disposed session");
                return Err(SessionError::Disposed);
            };
            self.publish(&session);
            (installed, session.view())
        };

        info!(
            step_id = %step_id,
            narrated = installed.narration_audio_url.is_some(),
            ending = ?installed.ending,
            "step installed"
        );
        self.spawn_narration(installed);
        Ok(view)
    }

    fn fail(&self, ticket: Ticket, error: TransportError) -> Result<SessionView, SessionError> {
        let mut session = self.session();
        if !session.fail(ticket, error.to_string()) {
            debug!(error = %error, "discarding failure for a disposed session");
            return Err(SessionError::Disposed);
        }
        warn!(error = %error, "session round-trip failed");
        self.publish(&session);
        Err(SessionError::Transport(error))
    }

    /// Opens the gate for `ticket`. Returns `false` if the result is stale.
    fn finish_narration(&self, ticket: Ticket, outcome: PlaybackOutcome) -> bool {
        let mut session = self.session();
        if !session.finish_narration(ticket) {
            debug!(?outcome, "discarding stale narration result");
            return false;
        }
        debug!(?outcome, "narration resolved, choices enabled");
        self.publish(&session);
        true
    }

    /// Plays the step's narration and then, for endings, an outcome voice
    /// line. Holds only a weak reference while playing.
    fn spawn_narration(self: &Arc<Self>, installed: Installed) {
        if installed.narration_audio_url.is_none() && installed.ending.is_none() {
            return;
        }

        let inner: Weak<Self> = Arc::downgrade(self);
        let player = self.player.clone();
        let voice_lines = self.voice_lines.clone();
        tokio::spawn(async move {
            if let Some(url) = &installed.narration_audio_url {
                let outcome = player.play(url).await;
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                if !inner.finish_narration(installed.ticket, outcome) {
                    return;
                }
            }

            if let Some(outcome) = installed.ending {
                let category = match outcome {
                    Outcome::Success => VoiceLineCategory::Success,
                    Outcome::Failure => VoiceLineCategory::Failure,
                };
                voice_lines.play_random(category).await;
            }
        });
    }
}
