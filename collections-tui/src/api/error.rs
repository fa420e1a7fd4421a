use thiserror::Error;

/// Failure of a backend operation.
///
/// Non-2xx responses carry the numeric status even when the body is not
/// parseable; a `detail` message is extracted from structured bodies
/// best-effort.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{}", server_message(.status, .detail))]
    Server { status: u16, detail: Option<String> },
}

impl ApiError {
    /// Build a server error from a non-2xx response body.
    pub fn server(status: u16, body: &str) -> Self {
        ApiError::Server {
            status,
            detail: extract_detail(body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Server { status, .. } => Some(*status),
        }
    }
}

fn server_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("request failed with status {status}"),
    }
}

/// Pull a human-readable `detail` out of an error body, if there is one.
/// Unparseable bodies are not an error themselves; the status code is what
/// matters then.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
