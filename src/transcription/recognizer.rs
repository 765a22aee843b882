use anyhow::Result;
use tokio::sync::mpsc;

/// Error codes reported by a speech recognizer.
///
/// `NoSpeech` and `Aborted` are expected in normal operation and are never
/// surfaced to the user; the rest are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerErrorCode {
    /// No speech was detected before the recognizer gave up.
    NoSpeech,
    /// The recognition session was aborted, e.g. superseded by a restart.
    Aborted,
    /// The recognizer lost its network connection.
    Network,
    /// Microphone access is blocked for recognition.
    NotAllowed,
    /// Any other recognizer-reported code, surfaced generically.
    Other(String),
}

/// Incremental events delivered by a live recognition session.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    Started,
    /// Newly confirmed segments plus the full current unconfirmed text.
    /// The interim text replaces any prior interim text wholesale;
    /// confirmed segments are delivered exactly once.
    Result { finals: Vec<String>, interim: String },
    Error(RecognizerErrorCode),
    /// The recognizer terminated on its own.
    Ended,
}

/// Live speech recognition capability.
///
/// Same stop contract as capture: once `stop` resolves, no further event
/// may be delivered on the receiver returned by `start`.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Begin a recognition session. Returns a receiver of incremental
    /// and terminal events.
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizerEvent>>;

    /// End the recognition session.
    async fn stop(&mut self) -> Result<()>;

    /// Get recognizer name for logging
    fn name(&self) -> &str;
}

/// Recognizer that never produces results, for environments without live
/// speech recognition (the CLI demo). Voice turns then fall back to the
/// no-speech path; text turns are unaffected.
pub struct NullRecognizer {
    session: Option<mpsc::Sender<RecognizerEvent>>,
}

impl NullRecognizer {
    pub fn new() -> Self {
        Self { session: None }
    }
}

impl Default for NullRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for NullRecognizer {
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizerEvent>> {
        let (tx, rx) = mpsc::channel(8);
        let _ = tx.send(RecognizerEvent::Started).await;
        // Holding the sender keeps the session open until stop.
        self.session = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.session = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
