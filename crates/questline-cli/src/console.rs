//! Interactive terminal loop.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use questline_audio::SoundSettings;
use questline_core::navigation::Navigator;
use questline_core::theme::Theme;
use questline_session::{EndingView, GameSessionController, SceneView, SessionError, SessionView};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;

/// Records the controller's request to go back to theme selection.
#[derive(Debug, Default)]
pub struct ConsoleNavigator {
    requested: AtomicBool,
}

impl ConsoleNavigator {
    /// Returns and clears a pending handoff.
    pub fn take_request(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}

impl Navigator for ConsoleNavigator {
    fn return_to_character_creation(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

enum Flow {
    Quit,
    NewGame,
}

/// Reads commands from `input` and renders views to `output`.
pub struct Console<R, W> {
    input: Lines<R>,
    output: W,
    settings: SoundSettings,
    navigator: Arc<ConsoleNavigator>,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Creates a console over the given streams.
    pub fn new(
        input: R,
        output: W,
        settings: SoundSettings,
        navigator: Arc<ConsoleNavigator>,
    ) -> Self {
        Self {
            input: input.lines(),
            output,
            settings,
            navigator,
        }
    }

    /// Runs games until the player quits or input ends. `make_controller` is
    /// called once per game.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the terminal cannot be read or written.
    pub async fn run(
        &mut self,
        make_controller: impl Fn() -> GameSessionController,
    ) -> Result<(), AppError> {
        loop {
            let Some(theme) = self.pick_theme().await? else {
                return Ok(());
            };
            let controller = make_controller();
            let seed = Uuid::new_v4().to_string();
            info!(theme = %theme, "new game");

            let flow = self.play(&controller, &theme, &seed).await;
            controller.dispose();
            match flow? {
                Flow::Quit => return Ok(()),
                Flow::NewGame => {}
            }
        }
    }

    async fn pick_theme(&mut self) -> Result<Option<Theme>, AppError> {
        writeln!(self.output, "\nPick a theme:")?;
        let catalog: Vec<Theme> = Theme::catalog().collect();
        for (number, theme) in catalog.iter().enumerate() {
            writeln!(self.output, "  {}) {theme}", number + 1)?;
        }
        write!(
            self.output,
            "Number or name [{}], q to quit > ",
            Theme::default()
        )?;
        self.output.flush()?;

        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line == "q" {
            return Ok(None);
        }

        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| catalog.get(index).cloned())
            .or_else(|| Theme::parse(line))
            .unwrap_or_default();
        Ok(Some(picked))
    }

    async fn play(
        &mut self,
        controller: &GameSessionController,
        theme: &Theme,
        seed: &str,
    ) -> Result<Flow, AppError> {
        self.attempt(controller.start(theme.as_str(), seed).await)?;

        loop {
            if let Some(flow) = self.await_narration(controller).await? {
                return Ok(flow);
            }
            let view = controller.view();
            self.render(&view)?;

            let Some(line) = self.read_line().await? else {
                return Ok(Flow::Quit);
            };
            match line.trim() {
                "q" => return Ok(Flow::Quit),
                "m" => self.toggle_mute()?,
                "n" if matches!(view, SessionView::Ended(_) | SessionView::Errored { .. }) => {
                    self.attempt(controller.start_new_game())?;
                    if self.navigator.take_request() {
                        return Ok(Flow::NewGame);
                    }
                }
                "r" if matches!(view, SessionView::Errored { .. }) => {
                    self.attempt(controller.start(theme.as_str(), seed).await)?;
                }
                "r" => self.attempt(controller.restart().await)?,
                other => match other.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                    Some(index) => self.attempt(controller.select_choice(index).await)?,
                    None => writeln!(self.output, "Unknown command {other:?}.")?,
                },
            }
        }
    }

    /// Blocks on the narration gate while still taking mute and quit.
    async fn await_narration(
        &mut self,
        controller: &GameSessionController,
    ) -> Result<Option<Flow>, AppError> {
        if !controller.view().is_narrating() {
            return Ok(None);
        }
        write!(self.output, "(narrating... m mute, q quit) ")?;
        self.output.flush()?;

        loop {
            let line = tokio::select! {
                () = controller.wait_for_choices() => return Ok(None),
                line = self.input.next_line() => line?,
            };
            match line.as_deref().map(str::trim) {
                None | Some("q") => return Ok(Some(Flow::Quit)),
                Some("m") => self.toggle_mute()?,
                Some(_) => writeln!(self.output, "Narration is still playing.")?,
            }
        }
    }

    fn toggle_mute(&mut self) -> Result<(), AppError> {
        let muted = self.settings.toggle_mute();
        writeln!(self.output, "Sound {}.", if muted { "off" } else { "on" })?;
        Ok(())
    }

    fn render(&mut self, view: &SessionView) -> Result<(), AppError> {
        match view {
            SessionView::Playing(scene) => self.render_scene(scene),
            SessionView::Ended(ending) => self.render_ending(ending),
            SessionView::Errored { message } => {
                writeln!(self.output, "\n{message}")?;
                write!(self.output, "r retry, n new game, q quit > ")?;
                Ok(self.output.flush()?)
            }
            SessionView::Uninitialized | SessionView::Loading => {
                write!(self.output, "q quit > ")?;
                Ok(self.output.flush()?)
            }
        }
    }

    fn render_scene(&mut self, scene: &SceneView) -> Result<(), AppError> {
        writeln!(self.output, "\n{}", scene.narration)?;
        writeln!(self.output, "  [scene] {}", scene.scene_image_url)?;
        if let Some(sheet) = &scene.character_sheet_url {
            writeln!(self.output, "  [character] {sheet}")?;
        }
        if scene.is_dead_end() {
            write!(self.output, "The path ends here. m mute, q quit > ")?;
            return Ok(self.output.flush()?);
        }
        for (number, choice) in scene.choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", number + 1, choice.text)?;
        }
        write!(
            self.output,
            "Choose 1-{}, m mute, q quit > ",
            scene.choices.len()
        )?;
        Ok(self.output.flush()?)
    }

    fn render_ending(&mut self, ending: &EndingView) -> Result<(), AppError> {
        writeln!(self.output, "\n{}", ending.narration)?;
        writeln!(self.output, "  [scene] {}", ending.scene_image_url)?;
        match ending.outcome {
            Some(outcome) => writeln!(self.output, "The end ({outcome}).")?,
            None => writeln!(self.output, "The end.")?,
        }
        if ending.can_restart {
            write!(self.output, "r restart, n new game, q quit > ")?;
        } else {
            write!(self.output, "n new game, q quit > ")?;
        }
        Ok(self.output.flush()?)
    }

    /// Prints a rejected operation. Only disposal ends the loop.
    fn attempt<T>(&mut self, result: Result<T, SessionError>) -> Result<(), AppError> {
        match result {
            Ok(_) => Ok(()),
            Err(SessionError::Disposed) => Err(SessionError::Disposed.into()),
            Err(SessionError::Transport(error)) => {
                debug!(error = %error, "round-trip failed");
                Ok(())
            }
            Err(error) => {
                writeln!(self.output, "{error}.")?;
                Ok(())
            }
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>, AppError> {
        Ok(self.input.next_line().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use questline_audio::{NarrationPlayer, VoiceLineLibrary, VoiceLineSelector};
    use questline_core::media::MediaPlayback;
    use questline_core::step::Outcome;
    use questline_session::ControllerParts;
    use questline_test_support::{
        GatedMedia, MockRng, RecordingTransport, ScriptedMedia, TransportCall, ending_step,
        narrated_step, plain_step,
    };

    fn factory_with(
        transport: &Arc<RecordingTransport>,
        navigator: &Arc<ConsoleNavigator>,
        media: Arc<dyn MediaPlayback>,
    ) -> impl Fn() -> GameSessionController {
        let transport = Arc::clone(transport);
        let navigator = Arc::clone(navigator);
        move || {
            let player = NarrationPlayer::new(media.clone(), SoundSettings::default());
            GameSessionController::new(ControllerParts {
                transport: transport.clone(),
                player: player.clone(),
                voice_lines: VoiceLineSelector::new(
                    player,
                    VoiceLineLibrary::empty(),
                    Arc::new(Mutex::new(MockRng)),
                ),
                navigator: navigator.clone(),
            })
        }
    }

    fn factory(
        transport: &Arc<RecordingTransport>,
        navigator: &Arc<ConsoleNavigator>,
    ) -> impl Fn() -> GameSessionController {
        factory_with(transport, navigator, Arc::new(ScriptedMedia::completing()))
    }

    #[tokio::test]
    async fn test_run_plays_through_to_an_ending_and_back() {
        // Arrange
        let transport = Arc::new(RecordingTransport::new(
            "g1",
            vec![
                Ok(plain_step("s0", &["Flee", "Fight"])),
                Ok(ending_step("s5", Outcome::Success, "You escaped.")),
            ],
        ));
        let navigator = Arc::new(ConsoleNavigator::default());
        let input: &[u8] = b"3\n2\nn\nq\n";
        let mut output = Vec::new();

        // Act
        {
            let settings = SoundSettings::default();
            let mut console = Console::new(input, &mut output, settings, navigator.clone());
            console.run(factory(&transport, &navigator)).await.unwrap();
        }

        // Assert
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Narration for s0."));
        assert!(text.contains("2) Fight"));
        assert!(text.contains("You escaped."));
        assert!(text.contains("The end (success)."));

        let calls = transport.calls();
        assert!(matches!(
            &calls[0],
            TransportCall::Start(request) if request.theme == "Cyberpunk Underworld"
        ));
        assert!(matches!(
            &calls[1],
            TransportCall::Advance(request) if request.choice_index == 1
        ));
    }

    #[tokio::test]
    async fn test_run_reports_load_failure_and_rejected_choices() {
        // Arrange
        let transport = Arc::new(RecordingTransport::new("g1", vec![]));
        let navigator = Arc::new(ConsoleNavigator::default());
        let input: &[u8] = b"\n7\nq\n";
        let mut output = Vec::new();

        // Act
        {
            let settings = SoundSettings::default();
            let mut console = Console::new(input, &mut output, settings, navigator.clone());
            console.run(factory(&transport, &navigator)).await.unwrap();
        }

        // Assert
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Could not load game data."));
        assert!(text.contains("select_choice is not available while errored."));
        assert!(matches!(
            &transport.calls()[0],
            TransportCall::Start(request) if request.theme == "Curse of the Banana King"
        ));
    }

    #[tokio::test]
    async fn test_mute_toggles_shared_settings() {
        // Arrange
        let transport = Arc::new(RecordingTransport::new(
            "g1",
            vec![Ok(plain_step("s0", &["Go"]))],
        ));
        let navigator = Arc::new(ConsoleNavigator::default());
        let settings = SoundSettings::default();
        let input: &[u8] = b"1\nm\n";
        let mut output = Vec::new();

        // Act
        {
            let mut console = Console::new(input, &mut output, settings.clone(), navigator.clone());
            console.run(factory(&transport, &navigator)).await.unwrap();
        }

        // Assert
        assert!(settings.is_muted());
        assert!(String::from_utf8(output).unwrap().contains("Sound off."));
    }

    #[tokio::test]
    async fn test_mute_and_quit_are_taken_during_narration() {
        // Arrange
        let transport = Arc::new(RecordingTransport::new(
            "g1",
            vec![Ok(narrated_step("s0", "http://a/s0.mp3", &["Go"]))],
        ));
        let navigator = Arc::new(ConsoleNavigator::default());
        let settings = SoundSettings::default();
        let input: &[u8] = b"1\n2\nm\nq\n";
        let mut output = Vec::new();

        // Act
        {
            let mut console = Console::new(input, &mut output, settings.clone(), navigator.clone());
            let media = Arc::new(GatedMedia::new());
            let make_controller = factory_with(&transport, &navigator, media);
            console.run(make_controller).await.unwrap();
        }

        // Assert
        let text = String::from_utf8(output).unwrap();
        assert!(settings.is_muted());
        assert!(text.contains("(narrating... m mute, q quit)"));
        assert!(text.contains("Narration is still playing."));
        assert!(text.contains("Sound off."));
        assert!(!text.contains("Choose 1-1"));
        assert_eq!(transport.calls().len(), 1);
    }
}
