use serde::{Deserialize, Serialize};

/// Role attached to a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Missing and unrecognized role tags default to `system`: the
    /// service may grow new roles, and an advisory notice beats a
    /// dropped message.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("user") => Role::User,
            Some("assistant") => Role::Assistant,
            _ => Role::System,
        }
    }
}

/// Outgoing turn kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    Text,
    Audio,
}

/// Outgoing turn, coordinator to service.
///
/// For audio turns, `content` carries the base64 capture payload and
/// `transcription` the client-side transcript.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundTurn {
    #[serde(rename = "type")]
    pub kind: TurnKind,

    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,

    #[serde(rename = "voiceStyle")]
    pub voice_style: String,
}

/// Raw incoming message, service to coordinator. Every field is optional
/// on the wire.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub role: Option<String>,

    pub content: Option<String>,

    /// Base64 synthesized speech, present on some assistant turns
    pub audio: Option<String>,

    #[serde(rename = "interviewComplete", default)]
    pub interview_complete: bool,

    /// Informational answer rating attached by the service
    pub rating: Option<f64>,
}

/// A turn worth surfacing to the rendering collaborator.
#[derive(Debug, Clone)]
pub struct DisplayTurn {
    pub role: Role,
    pub content: String,
    pub audio: Option<String>,
    pub rating: Option<f64>,
}

/// Classification of one parsed inbound message.
#[derive(Debug, Clone)]
pub struct Classified {
    /// Present when the message should be displayed
    pub turn: Option<DisplayTurn>,

    /// The message carried the interview-complete flag
    pub complete: bool,
}

/// Parse and classify an inbound payload.
///
/// Assistant and system messages always display; user-role echoes only
/// display when they carry content. The completion flag is honored
/// regardless of role or displayability.
pub fn classify(payload: &str) -> Result<Classified, serde_json::Error> {
    let msg: InboundMessage = serde_json::from_str(payload)?;

    let role = Role::from_tag(msg.role.as_deref());
    let content = msg.content.unwrap_or_default();

    let displayable =
        matches!(role, Role::Assistant | Role::System) || !content.trim().is_empty();

    let turn = displayable.then(|| DisplayTurn {
        role,
        content,
        audio: msg.audio.filter(|a| !a.is_empty()),
        rating: msg.rating,
    });

    Ok(Classified {
        turn,
        complete: msg.interview_complete,
    })
}
