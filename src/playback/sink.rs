use anyhow::Result;
use tracing::info;

use super::decode::DecodedAudio;

/// Playback capability: consumes one decoded buffer per call.
///
/// The buffer is moved into the call, so its release happens exactly once
/// whether playback completes or fails.
#[async_trait::async_trait]
pub trait AudioSink: Send + Sync {
    /// Play a decoded buffer to completion.
    async fn play(&mut self, audio: DecodedAudio) -> Result<()>;

    /// Get sink name for logging
    fn name(&self) -> &str;
}

/// Sink that logs instead of playing, for headless environments (the CLI
/// demo and tests that only care about negotiation order).
pub struct LoggingSink;

#[async_trait::async_trait]
impl AudioSink for LoggingSink {
    async fn play(&mut self, audio: DecodedAudio) -> Result<()> {
        info!(
            "Playback: {:.1}s, {}Hz, {} channels, {} samples",
            audio.duration_seconds(),
            audio.sample_rate,
            audio.channels,
            audio.samples.len()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
