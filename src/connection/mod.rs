//! Duplex channel to the remote interview service
//!
//! This module owns the WebSocket connection lifecycle:
//! - Endpoint derivation from the page origin and session id
//! - Serialization of outgoing turns
//! - Parsing and classification of incoming messages
//! - (Re)connect handling; at most one live connection per session

mod client;
mod endpoint;
mod messages;

pub use client::{ConnectionState, SessionConnection, CLOSE_NORMAL};
pub use endpoint::interview_endpoint;
pub use messages::{classify, Classified, DisplayTurn, InboundMessage, OutboundTurn, Role, TurnKind};
