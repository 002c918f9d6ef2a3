//! Questline terminal client entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use questline_audio::background::DEFAULT_TRACK;
use questline_audio::{
    BackgroundMusic, NarrationPlayer, SoundSettings, VoiceLineCategory, VoiceLineLibrary,
    VoiceLineSelector,
};
use questline_core::rng::SystemRng;
use questline_session::{ControllerParts, GameSessionController};
use questline_transport::HttpSessionTransport;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::config::{ClientConfig, LogFormat};
use crate::console::{Console, ConsoleNavigator};
use crate::error::AppError;
use crate::media::HeadlessMedia;

mod config;
mod console;
mod error;
mod media;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Read configuration from environment.
    let config = ClientConfig::from_env()?;

    // Initialize tracing subscriber.
    init_tracing(config.log_format);
    tracing::info!(api_url = %config.api_url, "Starting Questline client");

    let transport = Arc::new(
        HttpSessionTransport::new(config.api_url.clone(), config.request_timeout)
            .map_err(|e| AppError::Config(e.to_string()))?,
    );
    match transport.ping().await {
        Ok(ping) => tracing::info!(status = %ping.status, "story server reachable"),
        Err(error) => tracing::warn!(error = %error, "story server did not answer the ping"),
    }

    // Build the audio layer.
    let client = reqwest::Client::builder()
        .timeout(config.narration_timeout)
        .build()
        .map_err(|e| AppError::Config(format!("failed to build media client: {e}")))?;
    let settings = SoundSettings::new(config.muted);
    let narration_media = Arc::new(HeadlessMedia::new(client.clone()));
    let player = NarrationPlayer::new(narration_media, settings.clone())
        .with_timeout(config.narration_timeout);
    let library = VoiceLineLibrary::default().map_urls(|clip| transport.resolve_resource(clip));
    let voice_lines = VoiceLineSelector::new(
        player.clone(),
        library,
        Arc::new(Mutex::new(SystemRng::new())),
    );
    let music = BackgroundMusic::new(
        Arc::new(HeadlessMedia::new(client).paced()),
        settings.clone(),
        &transport.resolve_resource(DEFAULT_TRACK),
    );

    voice_lines.spawn_random(VoiceLineCategory::Welcome);
    music.play();

    let navigator = Arc::new(ConsoleNavigator::default());
    let make_controller = || {
        GameSessionController::new(ControllerParts {
            transport: transport.clone(),
            player: player.clone(),
            voice_lines: voice_lines.clone(),
            navigator: navigator.clone(),
        })
    };

    let mut console = Console::new(
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        settings,
        navigator.clone(),
    );
    console.run(make_controller).await?;

    music.stop();
    tracing::info!("Questline client exiting");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
