use base64::Engine;
use tracing::{debug, info, warn};

use super::decode::decode_audio;
use super::sink::AudioSink;

/// Candidate encodings tried against the same byte buffer, preferred
/// first: lossy-compressed, then uncompressed, then a generic container
/// probe.
const CANDIDATES: &[(&str, Option<&str>)] =
    &[("mp3", Some("mp3")), ("wav", Some("wav")), ("probe", None)];

/// Decode a delivered base64 audio payload, stripping the benign `//`
/// prefix artifact some payloads carry.
pub fn decode_base64_payload(payload: &str) -> Option<Vec<u8>> {
    let trimmed = payload.trim();
    let trimmed = trimmed.strip_prefix("//").unwrap_or(trimmed);

    match base64::engine::general_purpose::STANDARD.decode(trimmed) {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => None,
        Err(e) => {
            warn!("Delivered audio payload is not valid base64: {}", e);
            None
        }
    }
}

/// Negotiates a playable encoding for delivered audio.
pub struct PlaybackNegotiator {
    sink: Box<dyn AudioSink>,
}

impl PlaybackNegotiator {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self { sink }
    }

    /// Decode and play a delivered payload. Falls through to the next
    /// candidate only on decode or playback failure; returns whether any
    /// candidate played. An all-candidates failure raises nothing to the
    /// user: the text turn has already been displayed.
    pub async fn play_payload(&mut self, payload: &str) -> bool {
        let Some(bytes) = decode_base64_payload(payload) else {
            return false;
        };

        for (label, hint) in CANDIDATES {
            let audio = match decode_audio(&bytes, *hint) {
                Ok(audio) => audio,
                Err(e) => {
                    debug!("Candidate {} failed to decode: {:#}", label, e);
                    continue;
                }
            };

            let duration = audio.duration_seconds();
            match self.sink.play(audio).await {
                Ok(()) => {
                    info!("Played delivered audio as {} ({:.1}s)", label, duration);
                    return true;
                }
                Err(e) => {
                    warn!("Candidate {} failed to play: {:#}", label, e);
                }
            }
        }

        warn!("No playable encoding found for delivered audio, abandoning playback");
        false
    }
}
