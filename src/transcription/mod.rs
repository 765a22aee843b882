//! Live speech transcription
//!
//! The `TranscriptionAccumulator` owns a speech recognition session and
//! merges its incremental results into a single transcript: confirmed
//! segments append once, the interim text is replaced wholesale on every
//! update. A recognizer that terminates on its own is restarted up to a
//! bounded number of times; a hard ceiling timer (armed by the
//! coordinator) prevents recognition from running unbounded.

mod accumulator;
mod recognizer;

pub use accumulator::{
    ErrorDisposition, TranscriptionAccumulator, TranscriptionState, LISTENING_PLACEHOLDER,
};
pub use recognizer::{NullRecognizer, RecognizerErrorCode, RecognizerEvent, SpeechRecognizer};
