use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use super::config::{SessionConfig, DEFAULT_VOICE_STYLE, VOICE_STYLES};
use super::observer::{AlertSeverity, SessionObserver};
use super::session::{InterviewSession, TranscriptEntry};
use crate::capture::{CaptureBackend, CaptureBuffer};
use crate::connection::{
    interview_endpoint, OutboundTurn, Role, SessionConnection, TurnKind, CLOSE_NORMAL,
};
use crate::error::SessionError;
use crate::events::{MessageOutcome, SessionEvent};
use crate::playback::{AudioSink, PlaybackNegotiator};
use crate::transcription::{
    ErrorDisposition, RecognizerErrorCode, RecognizerEvent, SpeechRecognizer,
    TranscriptionAccumulator, TranscriptionState, LISTENING_PLACEHOLDER,
};

/// Depth of the coordinator's event queue. Sources awaiting a full queue
/// simply back-pressure; ordering is preserved.
const EVENT_QUEUE_DEPTH: usize = 64;

/// Coordinator phase. `Submitting` and `AwaitingReply` together form the
/// in-flight guard: no second turn may be submitted while in either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recording,
    Submitting,
    AwaitingReply,
}

/// Top-level state machine for one interview session.
pub struct TurnCoordinator {
    config: SessionConfig,
    endpoint: Url,
    phase: Phase,
    session: InterviewSession,

    capture: CaptureBuffer,
    transcription: TranscriptionAccumulator,
    connection: SessionConnection,
    playback: PlaybackNegotiator,
    observer: Box<dyn SessionObserver>,

    events: mpsc::Sender<SessionEvent>,

    /// Canonical transcript of the conversation
    transcript: Vec<TranscriptEntry>,

    /// Current recording ceiling arm; stale firings are ignored
    recording_generation: u64,

    /// Current transcription ceiling arm; stale firings are ignored
    transcription_generation: u64,
}

impl TurnCoordinator {
    /// Build a coordinator. Fails only on an invalid session id or
    /// origin, the one unrecoverable precondition.
    pub fn new(
        config: SessionConfig,
        capture: Box<dyn CaptureBackend>,
        recognizer: Box<dyn SpeechRecognizer>,
        sink: Box<dyn AudioSink>,
        observer: Box<dyn SessionObserver>,
    ) -> Result<(Self, mpsc::Receiver<SessionEvent>), SessionError> {
        let mut config = config;
        if !VOICE_STYLES.contains(&config.voice_style.as_str()) {
            warn!(
                "Unknown voice style {:?}, falling back to {}",
                config.voice_style, DEFAULT_VOICE_STYLE
            );
            config.voice_style = DEFAULT_VOICE_STYLE.to_string();
        }

        let endpoint = interview_endpoint(&config.origin, &config.session_id)?;
        let (events, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

        let coordinator = Self {
            session: InterviewSession::new(config.session_id.clone()),
            transcription: TranscriptionAccumulator::new(
                recognizer,
                config.recognizer_restart_cap,
            ),
            capture: CaptureBuffer::new(capture),
            playback: PlaybackNegotiator::new(sink),
            connection: SessionConnection::new(),
            observer,
            events,
            endpoint,
            config,
            phase: Phase::Idle,
            transcript: Vec::new(),
            recording_generation: 0,
            transcription_generation: 0,
        };

        Ok((coordinator, events_rx))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn transcription_state(&self) -> &TranscriptionState {
        self.transcription.state()
    }

    pub fn connection(&self) -> &SessionConnection {
        &self.connection
    }

    /// Sender feeding the coordinator's event queue; clone per source.
    pub fn event_sender(&self) -> mpsc::Sender<SessionEvent> {
        self.events.clone()
    }

    /// Open the connection to the interview service.
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.connection
            .open(&self.endpoint, self.events.clone())
            .await
    }

    /// Drive the coordinator from its event queue until every sender is
    /// gone. Events are processed one at a time in arrival order.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        info!("Coordinator event loop finished");
    }

    /// Process one event. Command rejections are already reported to the
    /// observer by the command methods; here they are only logged.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::StartRecording => {
                if let Err(e) = self.start_recording().await {
                    debug!("Start recording rejected: {}", e);
                }
            }
            SessionEvent::StopRecording => {
                if let Err(e) = self.stop_and_submit().await {
                    debug!("Stop recording rejected: {}", e);
                }
            }
            SessionEvent::SubmitText(text) => {
                if let Err(e) = self.submit_text(text).await {
                    debug!("Text submission rejected: {}", e);
                }
            }
            SessionEvent::Reconnect => {
                if let Err(e) = self.connect().await {
                    warn!("Manual reconnect failed: {:#}", e);
                    self.observer.alert(
                        AlertSeverity::Error,
                        "Could not reconnect to the interview service. Please try again.",
                    );
                }
            }

            SessionEvent::RecognitionStarted => {
                debug!("Recognition session started");
            }
            SessionEvent::RecognitionResult { finals, interim } => {
                self.transcription.apply_result(&finals, &interim);
            }
            SessionEvent::RecognitionError(code) => {
                self.handle_recognition_error(code);
            }
            SessionEvent::RecognitionEnded => {
                if let Some(rx) = self.transcription.handle_ended().await {
                    self.spawn_recognizer_forwarder(rx);
                } else if !self.transcription.is_active() {
                    // Ceiling is moot once the session settled.
                    self.transcription_generation += 1;
                }
            }

            SessionEvent::RecordingCeiling { generation } => {
                self.handle_recording_ceiling(generation).await;
            }
            SessionEvent::TranscriptionCeiling { generation } => {
                self.handle_transcription_ceiling(generation).await;
            }

            SessionEvent::SocketOpen => {
                debug!("Socket open");
            }
            SessionEvent::SocketMessage(outcome) => {
                self.handle_inbound(outcome).await;
            }
            SessionEvent::SocketClosed { code, epoch } => {
                self.handle_closed(code, epoch).await;
            }
        }
    }

    /// `Idle -> Recording`: start capture and recognition together and
    /// arm the recording safety ceiling.
    pub async fn start_recording(&mut self) -> Result<(), SessionError> {
        if self.session.is_complete() {
            self.observer.alert(
                AlertSeverity::Info,
                "The interview is complete; no further answers can be recorded.",
            );
            return Err(SessionError::SessionComplete);
        }

        if self.phase == Phase::Recording {
            warn!("Recording already started");
            return Ok(());
        }

        if matches!(self.phase, Phase::Submitting | Phase::AwaitingReply) {
            return Err(SessionError::TurnInFlight);
        }

        // Capture and recognition start together; a recognizer failure
        // rolls the capture back rather than leaving a silent desync.
        self.capture.start().await.map_err(|e| {
            self.observer.alert(
                AlertSeverity::Error,
                "Could not access the microphone. Check permissions and try again.",
            );
            e
        })?;

        match self.transcription.start().await {
            Ok(rx) => self.spawn_recognizer_forwarder(rx),
            Err(e) => {
                warn!("Recognizer failed to start: {:#}", e);
                if let Err(stop_err) = self.capture.stop().await {
                    warn!("Capture rollback failed: {:#}", stop_err);
                }
                self.observer.alert(
                    AlertSeverity::Error,
                    "Speech recognition could not be started. Please try again.",
                );
                return Err(SessionError::RecognizerUnavailable(format!("{e:#}")));
            }
        }

        self.phase = Phase::Recording;
        self.arm_recording_ceiling();
        self.arm_transcription_ceiling();

        info!("Recording started");
        Ok(())
    }

    /// `Recording -> Submitting -> AwaitingReply`: stop both capture
    /// paths, package the turn, and send it. An empty or placeholder-only
    /// transcript aborts back to `Idle` without submitting. Completion
    /// that latched mid-recording also aborts: once the interview is
    /// complete, the recording controls may not submit anything.
    pub async fn stop_and_submit(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Recording {
            return Err(SessionError::NotRecording);
        }

        if self.session.is_complete() {
            self.recording_generation += 1;
            self.transcription_generation += 1;

            self.transcription.stop().await;
            if let Err(e) = self.capture.stop().await {
                warn!("Capture stop failed: {:#}", e);
            }
            self.capture.discard().await;
            let _ = self.transcription.take_transcript();

            self.back_to_idle();
            self.observer.alert(
                AlertSeverity::Info,
                "The interview is complete; this recording was not submitted.",
            );
            return Err(SessionError::SessionComplete);
        }

        self.phase = Phase::Submitting;
        self.observer.processing_changed(true);

        // Disarm both ceilings.
        self.recording_generation += 1;
        self.transcription_generation += 1;

        // Recognition stops first so it is not left listening while the
        // audio source tears down.
        self.transcription.stop().await;
        if let Err(e) = self.capture.stop().await {
            warn!("Capture stop failed: {:#}", e);
        }

        let transcript = self.transcription.take_transcript();
        if transcript.trim().is_empty() || transcript == LISTENING_PLACEHOLDER {
            self.capture.discard().await;
            self.back_to_idle();
            self.observer.alert(
                AlertSeverity::Warning,
                "No speech was detected. Please try again, or use the text input.",
            );
            return Err(SessionError::EmptyTranscript);
        }

        let payload = self.capture.take_payload().await;
        let turn = OutboundTurn {
            kind: TurnKind::Audio,
            content: payload,
            transcription: Some(transcript.clone()),
            voice_style: self.config.voice_style.clone(),
        };

        self.submit(turn, transcript).await
    }

    /// Submit a typed answer. Shares the in-flight guard with voice
    /// turns: a submission while one is pending is rejected, not queued.
    pub async fn submit_text(&mut self, text: String) -> Result<(), SessionError> {
        if self.phase != Phase::Idle {
            self.observer.alert(
                AlertSeverity::Info,
                "Please wait for the interviewer's reply before answering again.",
            );
            return Err(SessionError::TurnInFlight);
        }

        let trimmed = text.trim().to_string();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyTranscript);
        }

        self.phase = Phase::Submitting;
        self.observer.processing_changed(true);

        let turn = OutboundTurn {
            kind: TurnKind::Text,
            content: trimmed.clone(),
            transcription: None,
            voice_style: self.config.voice_style.clone(),
        };

        self.submit(turn, trimmed).await
    }

    /// Send a packaged turn, reconnecting at most once if the connection
    /// is not open. On success the phase moves to `AwaitingReply`.
    async fn submit(
        &mut self,
        turn: OutboundTurn,
        display_content: String,
    ) -> Result<(), SessionError> {
        if !self.connection.is_open() {
            info!("Connection not open, attempting a single reconnect");
            if let Err(e) = self.connect().await {
                warn!("Reconnect failed: {:#}", e);
                self.back_to_idle();
                self.observer.alert(
                    AlertSeverity::Error,
                    "Connection to the interview service was lost. Please try again.",
                );
                return Err(SessionError::ConnectionLost);
            }
        }

        if let Err(e) = self.connection.send(&turn).await {
            warn!("Failed to send turn: {:#}", e);
            self.back_to_idle();
            self.observer.alert(
                AlertSeverity::Error,
                "Your answer could not be sent. Please try again.",
            );
            return Err(SessionError::ConnectionLost);
        }

        self.phase = Phase::AwaitingReply;
        self.push_transcript(Role::User, &display_content, None);
        self.observer
            .turn_displayed(Role::User, &display_content, None);

        info!("Turn submitted, awaiting reply");
        Ok(())
    }

    async fn handle_inbound(&mut self, outcome: MessageOutcome) {
        match outcome {
            MessageOutcome::Malformed(err) => {
                warn!("Malformed inbound message: {}", err);
                // A parse failure must not leave the session blocked.
                self.clear_in_flight();
                self.observer.alert(
                    AlertSeverity::Warning,
                    "Received an unreadable message from the interview service.",
                );
            }
            MessageOutcome::Classified(msg) => {
                if msg.complete && self.session.mark_complete() {
                    info!("Interview complete");
                    self.observer.session_complete();
                }

                let Some(turn) = msg.turn else {
                    return;
                };

                self.push_transcript(turn.role, &turn.content, turn.rating);
                self.observer
                    .turn_displayed(turn.role, &turn.content, turn.rating);
                self.clear_in_flight();

                if let Some(audio) = turn.audio {
                    self.observer.speaking_changed(true);
                    let played = self.playback.play_payload(&audio).await;
                    self.observer.speaking_changed(false);
                    if !played {
                        debug!("Delivered audio was not playable; text already shown");
                    }
                }
            }
        }
    }

    async fn handle_closed(&mut self, code: u16, epoch: u64) {
        if epoch != self.connection.epoch() {
            debug!("Ignoring close from superseded connection (epoch {})", epoch);
            return;
        }

        self.connection.handle_closed(code).await;

        if code == CLOSE_NORMAL {
            info!("Connection closed normally");
        } else {
            warn!("Connection closed abnormally (code {})", code);
            self.observer.alert(
                AlertSeverity::Error,
                "The connection to the interview service was interrupted. Your next answer will reconnect automatically.",
            );
        }

        // An in-flight turn can no longer be answered on this connection.
        self.clear_in_flight();
    }

    fn handle_recognition_error(&mut self, code: RecognizerErrorCode) {
        let disposition = self.transcription.handle_error(&code);
        self.transcription_generation += 1;

        match disposition {
            ErrorDisposition::Benign => {
                debug!("Benign recognizer error: {:?}", code);
            }
            ErrorDisposition::Remediable(message) | ErrorDisposition::Generic(message) => {
                warn!("Recognizer error: {:?}", code);
                self.observer.alert(AlertSeverity::Warning, &message);
            }
        }
    }

    async fn handle_recording_ceiling(&mut self, generation: u64) {
        if generation != self.recording_generation || self.phase != Phase::Recording {
            debug!("Ignoring stale recording ceiling (generation {})", generation);
            return;
        }

        warn!("Recording ceiling reached, submitting automatically");
        if let Err(e) = self.stop_and_submit().await {
            debug!("Ceiling-forced submission aborted: {}", e);
        }
    }

    async fn handle_transcription_ceiling(&mut self, generation: u64) {
        if generation != self.transcription_generation || !self.transcription.is_active() {
            debug!(
                "Ignoring stale transcription ceiling (generation {})",
                generation
            );
            return;
        }

        warn!("Transcription ceiling reached, stopping recognition");
        self.transcription.stop().await;
        self.transcription_generation += 1;
    }

    /// Leave `Submitting`/`AwaitingReply`, telling the UI to stop
    /// waiting. Safe to call from any phase.
    fn clear_in_flight(&mut self) {
        if matches!(self.phase, Phase::Submitting | Phase::AwaitingReply) {
            self.back_to_idle();
        }
    }

    fn back_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.observer.processing_changed(false);
    }

    fn push_transcript(&mut self, role: Role, content: &str, rating: Option<f64>) {
        self.transcript.push(TranscriptEntry {
            role,
            content: content.to_string(),
            rating,
            timestamp: Utc::now(),
        });
    }

    fn arm_recording_ceiling(&mut self) {
        self.recording_generation += 1;
        let generation = self.recording_generation;
        let ceiling = self.config.recording_ceiling;
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::time::sleep(ceiling).await;
            let _ = events
                .send(SessionEvent::RecordingCeiling { generation })
                .await;
        });
    }

    fn arm_transcription_ceiling(&mut self) {
        self.transcription_generation += 1;
        let generation = self.transcription_generation;
        let ceiling = self.config.transcription_ceiling;
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::time::sleep(ceiling).await;
            let _ = events
                .send(SessionEvent::TranscriptionCeiling { generation })
                .await;
        });
    }

    /// Forward recognizer events into the coordinator's ordered queue.
    fn spawn_recognizer_forwarder(&self, mut rx: mpsc::Receiver<RecognizerEvent>) {
        let events = self.events.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let mapped = match event {
                    RecognizerEvent::Started => SessionEvent::RecognitionStarted,
                    RecognizerEvent::Result { finals, interim } => {
                        SessionEvent::RecognitionResult { finals, interim }
                    }
                    RecognizerEvent::Error(code) => SessionEvent::RecognitionError(code),
                    RecognizerEvent::Ended => SessionEvent::RecognitionEnded,
                };

                if events.send(mapped).await.is_err() {
                    break;
                }
            }
        });
    }
}
