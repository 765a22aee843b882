//! Synthesized speech playback
//!
//! The remote service's declared audio encoding is not always reliable, so
//! the `PlaybackNegotiator` tries a small ordered list of plausible
//! encodings against the same decoded byte buffer and plays the first one
//! that both decodes and plays. Audio is a non-critical enhancement: if
//! every candidate fails, playback is abandoned silently.

mod decode;
mod negotiator;
mod sink;

pub use decode::{decode_audio, DecodedAudio};
pub use negotiator::{decode_base64_payload, PlaybackNegotiator};
pub use sink::{AudioSink, LoggingSink};
