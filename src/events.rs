use crate::connection::Classified;
use crate::transcription::RecognizerErrorCode;

/// Tagged inputs to the coordinator's event loop.
///
/// Everything the coordinator reacts to (user actions, recognizer
/// callbacks, socket callbacks, timers) arrives here and is processed
/// strictly in arrival order, one event at a time.
#[derive(Debug)]
pub enum SessionEvent {
    /// User pressed the record control.
    StartRecording,
    /// User pressed the stop control.
    StopRecording,
    /// User submitted a typed answer.
    SubmitText(String),
    /// User asked for a manual reconnect after a connection error.
    Reconnect,

    RecognitionStarted,
    RecognitionResult { finals: Vec<String>, interim: String },
    RecognitionError(RecognizerErrorCode),
    RecognitionEnded,

    /// The recording safety ceiling fired. Stale generations are ignored.
    RecordingCeiling { generation: u64 },
    /// The transcription hard ceiling fired. Stale generations are ignored.
    TranscriptionCeiling { generation: u64 },

    SocketOpen,
    SocketMessage(MessageOutcome),
    /// The socket closed. `epoch` identifies the connection it belonged
    /// to, so a close from a superseded connection is ignored.
    SocketClosed { code: u16, epoch: u64 },
}

/// Result of parsing and classifying one inbound payload.
#[derive(Debug)]
pub enum MessageOutcome {
    Classified(Classified),
    /// Parse failure. Non-fatal, but it must still clear the in-flight
    /// guard or the session livelocks.
    Malformed(String),
}
