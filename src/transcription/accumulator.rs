use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::recognizer::{RecognizerErrorCode, RecognizerEvent, SpeechRecognizer};

/// Shown whenever no transcript text exists yet, so the UI always has
/// non-empty text to render. A transcript equal to this sentinel is
/// treated as empty on submission.
pub const LISTENING_PLACEHOLDER: &str = "[ Listening... ]";

/// Observable transcription state.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionState {
    /// Ordered concatenation of confirmed recognizer segments
    pub final_text: String,

    /// Most recent unconfirmed text, replaced wholesale on each update
    pub interim_text: String,

    /// Automatic restarts performed during this session
    pub restart_count: u32,

    /// Whether a recognition session is considered live
    pub active: bool,

    /// True while only the listening placeholder would be shown
    pub pending_placeholder: bool,
}

/// How a recognizer error should be reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Expected during normal operation; not surfaced.
    Benign,
    /// Surfaced with explicit remediation text.
    Remediable(String),
    /// Surfaced generically.
    Generic(String),
}

/// Owns a live recognition session and accumulates its results.
pub struct TranscriptionAccumulator {
    recognizer: Box<dyn SpeechRecognizer>,
    state: TranscriptionState,
    restart_cap: u32,
}

impl TranscriptionAccumulator {
    pub fn new(recognizer: Box<dyn SpeechRecognizer>, restart_cap: u32) -> Self {
        Self {
            recognizer,
            state: TranscriptionState::default(),
            restart_cap,
        }
    }

    pub fn state(&self) -> &TranscriptionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Start a fresh recognition session, clearing any prior transcript
    /// and resetting the restart counter.
    pub async fn start(&mut self) -> Result<mpsc::Receiver<RecognizerEvent>> {
        if self.state.active {
            warn!("Recognition already active, stopping previous session first");
            self.stop().await;
        }

        self.state = TranscriptionState {
            pending_placeholder: true,
            ..TranscriptionState::default()
        };

        let rx = self
            .recognizer
            .start()
            .await
            .context("Failed to start speech recognizer")?;

        self.state.active = true;
        info!("Recognition started via {} recognizer", self.recognizer.name());

        Ok(rx)
    }

    /// Merge an incremental recognizer update. Confirmed segments append
    /// exactly once; the interim text is replaced, never appended.
    pub fn apply_result(&mut self, finals: &[String], interim: &str) {
        if !self.state.active {
            // Late events from a stopped session carry nothing new.
            return;
        }

        for segment in finals {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            if !self.state.final_text.is_empty() {
                self.state.final_text.push(' ');
            }
            self.state.final_text.push_str(segment);
        }

        self.state.interim_text = interim.trim().to_string();
        self.state.pending_placeholder =
            self.state.final_text.is_empty() && self.state.interim_text.is_empty();
    }

    /// The externally visible transcript: confirmed text plus the current
    /// interim text, or the listening placeholder when both are empty.
    pub fn transcript(&self) -> String {
        let mut text = self.state.final_text.clone();
        if !self.state.interim_text.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&self.state.interim_text);
        }

        if text.trim().is_empty() {
            LISTENING_PLACEHOLDER.to_string()
        } else {
            text
        }
    }

    /// Consume the transcript, resetting accumulated text.
    pub fn take_transcript(&mut self) -> String {
        let text = self.transcript();
        self.state.final_text.clear();
        self.state.interim_text.clear();
        self.state.pending_placeholder = true;
        text
    }

    /// The recognizer ended on its own. Restart while under the cap;
    /// past it, settle to idle keeping whatever transcript accumulated.
    /// Returns the new event receiver when a restart happened.
    pub async fn handle_ended(&mut self) -> Option<mpsc::Receiver<RecognizerEvent>> {
        if !self.state.active {
            // Expected end after an explicit stop.
            return None;
        }

        if self.state.restart_count >= self.restart_cap {
            warn!(
                "Recognizer restart cap ({}) reached, keeping accumulated transcript",
                self.restart_cap
            );
            self.state.active = false;
            return None;
        }

        self.state.restart_count += 1;
        info!(
            "Recognizer ended unexpectedly, restarting ({}/{})",
            self.state.restart_count, self.restart_cap
        );

        // Release the previous session fully before starting a successor.
        if let Err(e) = self.recognizer.stop().await {
            warn!("Failed to stop recognizer before restart: {:#}", e);
        }

        match self.recognizer.start().await {
            Ok(rx) => Some(rx),
            Err(e) => {
                warn!("Recognizer restart failed: {:#}", e);
                self.state.active = false;
                None
            }
        }
    }

    /// Partition a recognizer error for reporting and deactivate. Every
    /// error branch leaves `active` false so the accumulator never believes
    /// it is live after the recognizer has stopped.
    pub fn handle_error(&mut self, code: &RecognizerErrorCode) -> ErrorDisposition {
        self.state.active = false;

        match code {
            RecognizerErrorCode::NoSpeech | RecognizerErrorCode::Aborted => {
                ErrorDisposition::Benign
            }
            RecognizerErrorCode::Network => ErrorDisposition::Remediable(
                "Speech recognition lost its network connection. Check your connection and try again."
                    .to_string(),
            ),
            RecognizerErrorCode::NotAllowed => ErrorDisposition::Remediable(
                "Microphone access is blocked. Allow microphone use in your browser settings and try again."
                    .to_string(),
            ),
            RecognizerErrorCode::Other(code) => {
                ErrorDisposition::Generic(format!("Speech recognition error: {code}"))
            }
        }
    }

    /// Explicitly end the recognition session.
    pub async fn stop(&mut self) {
        self.state.active = false;
        if let Err(e) = self.recognizer.stop().await {
            warn!("Failed to stop recognizer: {:#}", e);
        }
    }
}
