use anyhow::{Context, Result};
use base64::Engine;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::backend::CaptureBackend;
use crate::error::SessionError;

/// Accumulates encoded audio fragments from a capture backend.
///
/// The buffer holds at most one active capture: `start` awaits the full
/// stop of any previous capture before acquiring a new handle, so two
/// hardware handles can never be live at once.
pub struct CaptureBuffer {
    backend: Box<dyn CaptureBackend>,

    /// Ordered fragments, append-only while a capture is active
    fragments: Arc<Mutex<Vec<Vec<u8>>>>,

    /// Collector task draining the backend's fragment channel
    collector: Option<JoinHandle<()>>,

    recording: bool,
}

impl CaptureBuffer {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            fragments: Arc::new(Mutex::new(Vec::new())),
            collector: None,
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Start capturing. Any prior capture is stopped and drained first.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.recording || self.collector.is_some() {
            warn!("Capture already active, stopping previous capture first");
            if let Err(e) = self.stop().await {
                error!("Failed to stop previous capture: {:#}", e);
            }
        }

        self.fragments.lock().await.clear();

        let mut rx = self
            .backend
            .start()
            .await
            .map_err(|e| SessionError::MicrophoneUnavailable(format!("{e:#}")))?;

        self.recording = true;

        let fragments = Arc::clone(&self.fragments);
        self.collector = Some(tokio::spawn(async move {
            while let Some(fragment) = rx.recv().await {
                fragments.lock().await.push(fragment);
            }
        }));

        info!("Capture started via {} backend", self.backend.name());

        Ok(())
    }

    /// Stop capturing. Resolves only once the backend has confirmed its
    /// stop and every in-flight fragment has been collected, so payload
    /// assembly can safely begin afterwards.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.recording && self.collector.is_none() {
            return Ok(());
        }

        self.recording = false;

        self.backend
            .stop()
            .await
            .context("Failed to stop capture backend")?;

        if let Some(task) = self.collector.take() {
            if let Err(e) = task.await {
                error!("Capture collector panicked: {}", e);
            }
        }

        let count = self.fragments.lock().await.len();
        info!("Capture stopped: {} fragments buffered", count);

        Ok(())
    }

    /// Assemble the captured fragments into a base64 payload, consuming
    /// them. Assembly is deferred to this call so no per-fragment work
    /// happens during an active capture.
    pub async fn take_payload(&mut self) -> String {
        let mut fragments = self.fragments.lock().await;

        let total: usize = fragments.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for fragment in fragments.drain(..) {
            bytes.extend_from_slice(&fragment);
        }

        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    /// Drop any buffered fragments without encoding them.
    pub async fn discard(&mut self) {
        self.fragments.lock().await.clear();
    }

    pub async fn fragment_count(&self) -> usize {
        self.fragments.lock().await.len()
    }
}
