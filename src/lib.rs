//! Interview session client
//!
//! Client-side coordination for a voice-driven interview: microphone
//! capture, live speech transcription, synthesized speech playback, and
//! a duplex connection to the interview service, all arbitrated by a
//! single turn coordinator that guarantees at most one in-flight turn.

pub mod capture;
pub mod config;
pub mod connection;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod playback;
pub mod transcription;

pub use config::Config;
pub use coordinator::{Phase, SessionConfig, TurnCoordinator};
pub use error::SessionError;
pub use events::SessionEvent;
