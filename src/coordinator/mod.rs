//! Turn coordination
//!
//! The `TurnCoordinator` is the top-level state machine of the interview
//! client. It decides when recording may start, when a turn may be
//! submitted, when the UI must be told to wait, and when the session is
//! complete, while guaranteeing at most one in-flight turn and a
//! consistent, re-enterable state on every error path.

mod config;
mod coordinator;
mod observer;
mod session;

pub use config::{SessionConfig, DEFAULT_VOICE_STYLE, VOICE_STYLES};
pub use coordinator::{Phase, TurnCoordinator};
pub use observer::{AlertSeverity, LogObserver, SessionObserver};
pub use session::{InterviewSession, TranscriptEntry};
