// Shared test doubles for the integration suite: scripted capture and
// recognition backends, a recording observer, a failure-injecting audio
// sink, and a minimal loopback interview server.
//
// Not every test binary uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use interview_session::connection::Role;
use interview_session::capture::CaptureBackend;
use interview_session::coordinator::{AlertSeverity, SessionConfig, SessionObserver};
use interview_session::playback::{AudioSink, DecodedAudio};
use interview_session::transcription::{RecognizerEvent, SpeechRecognizer};

/// Capture backend that emits a fixed set of fragments and tracks how
/// many handles are live at once.
pub struct ScriptedCapture {
    fragments: Vec<Vec<u8>>,
    live: Arc<AtomicUsize>,
    pub max_live: Arc<AtomicUsize>,
    active: Arc<AtomicBool>,
    session: Option<mpsc::Sender<Vec<u8>>>,
    fail_start: bool,
}

impl ScriptedCapture {
    pub fn new(fragments: Vec<Vec<u8>>) -> Self {
        Self {
            fragments,
            live: Arc::new(AtomicUsize::new(0)),
            max_live: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicBool::new(false)),
            session: None,
            fail_start: false,
        }
    }

    pub fn failing() -> Self {
        let mut capture = Self::new(Vec::new());
        capture.fail_start = true;
        capture
    }
}

#[async_trait]
impl CaptureBackend for ScriptedCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<u8>>> {
        if self.fail_start {
            anyhow::bail!("capture device unavailable");
        }

        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(64);
        for fragment in &self.fragments {
            tx.send(fragment.clone()).await?;
        }
        // Hold the sender so the fragment stream stays open until stop.
        self.session = Some(tx);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.session = None;
        if self.active.swap(false, Ordering::SeqCst) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Recognizer that replays a script of events on every start.
pub struct ScriptedRecognizer {
    script: Vec<RecognizerEvent>,
    session: Option<mpsc::Sender<RecognizerEvent>>,
    pub starts: Arc<AtomicUsize>,
    fail_start: bool,
}

impl ScriptedRecognizer {
    pub fn new(script: Vec<RecognizerEvent>) -> Self {
        Self {
            script,
            session: None,
            starts: Arc::new(AtomicUsize::new(0)),
            fail_start: false,
        }
    }

    pub fn failing() -> Self {
        let mut recognizer = Self::new(Vec::new());
        recognizer.fail_start = true;
        recognizer
    }

    /// Script producing a single confirmed segment.
    pub fn with_transcript(text: &str) -> Self {
        Self::new(vec![
            RecognizerEvent::Started,
            RecognizerEvent::Result {
                finals: vec![text.to_string()],
                interim: String::new(),
            },
        ])
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn start(&mut self) -> Result<mpsc::Receiver<RecognizerEvent>> {
        if self.fail_start {
            anyhow::bail!("recognizer unavailable");
        }

        self.starts.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(32);
        for event in &self.script {
            tx.send(event.clone()).await?;
        }
        self.session = Some(tx);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.session = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Sink that records play calls and optionally fails every one.
pub struct RecordingSink {
    pub plays: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            plays: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        let mut sink = Self::new();
        sink.fail = true;
        sink
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn play(&mut self, _audio: DecodedAudio) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("playback device rejected the buffer");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Everything the coordinator reported to its observer, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Reported {
    Turn(Role, String, Option<f64>),
    Processing(bool),
    Speaking(bool),
    Complete,
    Alert(AlertSeverity, String),
}

#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub reports: Arc<Mutex<Vec<Reported>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Reported> {
        self.reports.lock().unwrap().clone()
    }

    pub fn completions(&self) -> usize {
        self.reports()
            .iter()
            .filter(|r| matches!(r, Reported::Complete))
            .count()
    }

    pub fn alerts(&self) -> Vec<(AlertSeverity, String)> {
        self.reports()
            .iter()
            .filter_map(|r| match r {
                Reported::Alert(severity, message) => Some((*severity, message.clone())),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for RecordingObserver {
    fn turn_displayed(&self, role: Role, content: &str, rating: Option<f64>) {
        self.reports
            .lock()
            .unwrap()
            .push(Reported::Turn(role, content.to_string(), rating));
    }

    fn processing_changed(&self, processing: bool) {
        self.reports
            .lock()
            .unwrap()
            .push(Reported::Processing(processing));
    }

    fn speaking_changed(&self, speaking: bool) {
        self.reports
            .lock()
            .unwrap()
            .push(Reported::Speaking(speaking));
    }

    fn session_complete(&self) {
        self.reports.lock().unwrap().push(Reported::Complete);
    }

    fn alert(&self, severity: AlertSeverity, message: &str) {
        self.reports
            .lock()
            .unwrap()
            .push(Reported::Alert(severity, message.to_string()));
    }
}

/// Loopback interview server: accepts connections, records received
/// text frames, and answers each one with the next scripted reply.
pub struct LoopbackServer {
    pub addr: SocketAddr,
    pub received: Arc<Mutex<Vec<String>>>,
}

impl LoopbackServer {
    pub async fn spawn(replies: Vec<String>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_in = Arc::clone(&received);
        tokio::spawn(async move {
            let replies = Arc::new(Mutex::new(replies));
            while let Ok((stream, _)) = listener.accept().await {
                let Ok(mut ws) = accept_async(stream).await else {
                    continue;
                };

                let received = Arc::clone(&received_in);
                let replies = Arc::clone(&replies);
                tokio::spawn(async move {
                    while let Some(Ok(message)) = ws.next().await {
                        if let Message::Text(text) = message {
                            received.lock().unwrap().push(text.to_string());
                            let reply = {
                                let mut replies = replies.lock().unwrap();
                                if replies.is_empty() {
                                    None
                                } else {
                                    Some(replies.remove(0))
                                }
                            };
                            if let Some(reply) = reply {
                                if ws.send(Message::Text(reply.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                });
            }
        });

        Ok(Self { addr, received })
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

/// Session config pointing at a loopback origin with test-friendly
/// ceilings.
pub fn test_config(origin: &str) -> SessionConfig {
    SessionConfig {
        session_id: "test-session".to_string(),
        origin: origin.to_string(),
        ..SessionConfig::default()
    }
}
