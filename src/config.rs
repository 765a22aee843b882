use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    /// Page origin the interview runs under, e.g. "https://interview.example.com".
    /// The WebSocket endpoint is derived from this (ws for http, wss for https).
    pub origin: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    /// Delivery voice requested for synthesized questions.
    pub voice_style: String,

    /// Seconds before an unattended recording is force-submitted.
    pub recording_ceiling_secs: u64,

    /// Seconds before a live recognition session is force-stopped.
    pub transcription_ceiling_secs: u64,

    /// Maximum automatic recognizer restarts per recording.
    pub recognizer_restart_cap: u32,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
