use thiserror::Error;

/// Errors surfaced by the session coordinator and its subsystems.
///
/// Precondition errors (`InvalidSession`, `TurnInFlight`, `SessionComplete`,
/// `NotRecording`) are rejected before any side effect. Resource and I/O
/// errors abort the attempted transition and leave the state machine
/// re-enterable.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session id is missing or the page origin cannot be parsed.
    /// This is the only unrecoverable condition in the core.
    #[error("invalid interview session: {0}")]
    InvalidSession(String),

    /// Exclusive microphone access could not be acquired.
    #[error("microphone unavailable: {0}")]
    MicrophoneUnavailable(String),

    /// The speech recognizer could not be started.
    #[error("speech recognizer unavailable: {0}")]
    RecognizerUnavailable(String),

    /// The connection is closed and the single reconnect attempt failed.
    #[error("connection to the interview service lost")]
    ConnectionLost,

    /// A turn has been submitted and no reply has arrived yet.
    #[error("a turn is already in flight")]
    TurnInFlight,

    /// Recording controls are disabled once the interview is complete.
    #[error("the interview is already complete")]
    SessionComplete,

    /// A stop/submit was requested while no recording was active.
    #[error("no recording in progress")]
    NotRecording,

    /// The accumulated transcript was empty or placeholder-only.
    #[error("no speech was captured")]
    EmptyTranscript,
}
