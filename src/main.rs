use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use interview_session::capture::FileCapture;
use interview_session::coordinator::{LogObserver, SessionConfig, TurnCoordinator, VOICE_STYLES};
use interview_session::playback::LoggingSink;
use interview_session::transcription::NullRecognizer;
use interview_session::{Config, SessionEvent};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "interview-session", about = "Voice interview session client")]
struct Args {
    /// Config file (without extension)
    #[arg(long, default_value = "config/interview-session")]
    config: String,

    /// Session id assigned by the interview service
    #[arg(long)]
    session_id: String,

    /// Override the service origin from the config file
    #[arg(long)]
    origin: Option<String>,

    /// Delivery voice for synthesized questions
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(VOICE_STYLES))]
    voice: Option<String>,

    /// Audio file to stream as the capture source
    #[arg(long)]
    audio_file: Option<String>,

    /// Typed answer to submit once connected
    #[arg(long)]
    text: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Loaded config: {}", cfg.service.name);

    let session_config = SessionConfig {
        session_id: args.session_id,
        origin: args.origin.unwrap_or(cfg.service.origin),
        voice_style: args.voice.unwrap_or(cfg.session.voice_style),
        recording_ceiling: Duration::from_secs(cfg.session.recording_ceiling_secs),
        transcription_ceiling: Duration::from_secs(cfg.session.transcription_ceiling_secs),
        recognizer_restart_cap: cfg.session.recognizer_restart_cap,
    };

    let capture_path = args
        .audio_file
        .unwrap_or_else(|| "tests/fixtures/sample-answer.wav".to_string());
    if !std::path::Path::new(&capture_path).exists() {
        info!("No capture source at {}", capture_path);
        info!("Voice turns need --audio-file; text turns are unaffected");
    }

    let (mut coordinator, events) = TurnCoordinator::new(
        session_config,
        Box::new(FileCapture::new(capture_path, 4096)),
        Box::new(NullRecognizer::new()),
        Box::new(LoggingSink),
        Box::new(LogObserver),
    )?;

    coordinator.connect().await?;

    if let Some(text) = args.text {
        coordinator
            .event_sender()
            .send(SessionEvent::SubmitText(text))
            .await?;
    }

    coordinator.run(events).await;

    Ok(())
}
