use tracing::{error, info, warn};

use crate::connection::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
}

/// Rendering-side collaborator. The coordinator tells it about
/// displayable turns, busy state, speech playback, completion, and
/// user-visible alerts; it never reaches back into the state machine.
pub trait SessionObserver: Send + Sync {
    /// A displayable turn arrived or was submitted.
    fn turn_displayed(&self, role: Role, content: &str, rating: Option<f64>);

    /// A turn is being submitted / a reply is awaited (drives loading
    /// indicators).
    fn processing_changed(&self, processing: bool);

    /// Synthesized speech playback started or stopped (drives the
    /// speaking animation).
    fn speaking_changed(&self, speaking: bool);

    /// The interview is complete.
    fn session_complete(&self);

    /// A user-visible notice, warning, or error.
    fn alert(&self, severity: AlertSeverity, message: &str);
}

/// Observer that renders through tracing, used by the CLI binary.
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn turn_displayed(&self, role: Role, content: &str, rating: Option<f64>) {
        match rating {
            Some(rating) => info!("[{:?}] {} (rating {:.1})", role, content, rating),
            None => info!("[{:?}] {}", role, content),
        }
    }

    fn processing_changed(&self, processing: bool) {
        info!(
            "{}",
            if processing {
                "Waiting for the interviewer..."
            } else {
                "Ready"
            }
        );
    }

    fn speaking_changed(&self, speaking: bool) {
        if speaking {
            info!("Interviewer speaking");
        }
    }

    fn session_complete(&self) {
        info!("Interview complete");
    }

    fn alert(&self, severity: AlertSeverity, message: &str) {
        match severity {
            AlertSeverity::Info => info!("{}", message),
            AlertSeverity::Warning => warn!("{}", message),
            AlertSeverity::Error => error!("{}", message),
        }
    }
}
