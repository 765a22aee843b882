use std::time::Duration;

/// Delivery voices offered by the interview service.
pub const VOICE_STYLES: [&str; 4] = ["Nova", "Orion", "Capella", "Callum"];

/// Voice requested when the user has not picked one.
pub const DEFAULT_VOICE_STYLE: &str = "Nova";

/// Configuration for one interview session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session identifier assigned by the interview service
    pub session_id: String,

    /// Page origin; the connection endpoint mirrors its scheme
    pub origin: String,

    /// Delivery voice requested for synthesized questions
    pub voice_style: String,

    /// An unattended recording is force-submitted after this long
    pub recording_ceiling: Duration,

    /// A live recognition session is force-stopped after this long
    pub transcription_ceiling: Duration,

    /// Maximum automatic recognizer restarts per recording
    pub recognizer_restart_cap: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: String::new(),
            origin: "http://localhost:8000".to_string(),
            voice_style: DEFAULT_VOICE_STYLE.to_string(),
            recording_ceiling: Duration::from_secs(30),
            transcription_ceiling: Duration::from_secs(60),
            recognizer_restart_cap: 3,
        }
    }
}
