use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Exclusive handle to an audio capture source.
///
/// Implementations must honor the stop contract: once `stop` resolves, no
/// further fragment may be delivered on the receiver returned by `start`.
/// Encoding only begins after that point.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Begin capturing with noise/echo/gain normalization where the
    /// hardware supports it.
    ///
    /// Returns a channel receiver of encoded audio fragments.
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<u8>>>;

    /// Stop capturing, waiting for the underlying stop event.
    async fn stop(&mut self) -> Result<()>;

    /// Check if the backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture backend that streams an audio file in fixed-size fragments.
///
/// Used by the CLI demo mode and by tests in place of real microphone
/// hardware.
pub struct FileCapture {
    path: PathBuf,
    fragment_bytes: usize,
    active: Arc<AtomicBool>,
    feeder: Option<JoinHandle<()>>,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>, fragment_bytes: usize) -> Self {
        Self {
            path: path.into(),
            fragment_bytes: fragment_bytes.max(1),
            active: Arc::new(AtomicBool::new(false)),
            feeder: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<Vec<u8>>> {
        if self.active.load(Ordering::SeqCst) {
            anyhow::bail!("File capture already active");
        }

        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read capture source {:?}", self.path))?;

        info!(
            "File capture started: {:?} ({} bytes, {}-byte fragments)",
            self.path,
            bytes.len(),
            self.fragment_bytes
        );

        let (tx, rx) = mpsc::channel(32);
        self.active.store(true, Ordering::SeqCst);

        let active = Arc::clone(&self.active);
        let fragment_bytes = self.fragment_bytes;
        self.feeder = Some(tokio::spawn(async move {
            for chunk in bytes.chunks(fragment_bytes) {
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(chunk.to_vec()).await.is_err() {
                    break;
                }
            }
            active.store(false, Ordering::SeqCst);
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);

        // Join the feeder so the fragment sender is dropped before we return.
        if let Some(task) = self.feeder.take() {
            if let Err(e) = task.await {
                error!("File capture feeder panicked: {}", e);
            }
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
