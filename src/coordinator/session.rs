use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::connection::Role;

/// One interview instance as known to the client. The id is assigned by
/// the remote service; completion is monotonic.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    id: String,
    complete: bool,
}

impl InterviewSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            complete: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Latch completion. Returns true only on the first transition, so
    /// repeated completion signals report exactly once.
    pub fn mark_complete(&mut self) -> bool {
        if self.complete {
            return false;
        }
        self.complete = true;
        true
    }
}

/// One line of the canonical conversation transcript.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,

    pub content: String,

    /// Informational answer rating attached by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    pub timestamp: DateTime<Utc>,
}
