use url::Url;

use crate::error::SessionError;

/// Derive the interview endpoint from the page origin and session id:
/// `{ws|wss}://<host>/interview/<id>`, the scheme mirroring the page's
/// own scheme. A missing id or unparseable origin is a fatal
/// precondition failure.
pub fn interview_endpoint(origin: &str, session_id: &str) -> Result<Url, SessionError> {
    let id = session_id.trim();
    if id.is_empty() {
        return Err(SessionError::InvalidSession("missing session id".to_string()));
    }

    let origin = Url::parse(origin)
        .map_err(|e| SessionError::InvalidSession(format!("unparseable origin {origin:?}: {e}")))?;

    let scheme = match origin.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(SessionError::InvalidSession(format!(
                "unsupported origin scheme {other:?}"
            )))
        }
    };

    let host = origin
        .host_str()
        .ok_or_else(|| SessionError::InvalidSession("origin has no host".to_string()))?;

    let authority = match origin.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    Url::parse(&format!("{scheme}://{authority}/interview/{id}"))
        .map_err(|e| SessionError::InvalidSession(e.to_string()))
}
