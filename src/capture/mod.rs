//! Microphone capture lifecycle and payload assembly
//!
//! The `CaptureBuffer` owns at most one live capture handle at a time:
//! starting a new capture fully stops and drains the previous one first.
//! Fragments accumulate in order while recording; the payload is only
//! assembled (concatenated and base64-encoded) when requested.

mod backend;
mod buffer;

pub use backend::{CaptureBackend, FileCapture};
pub use buffer::CaptureBuffer;
