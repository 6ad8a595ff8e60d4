use saasprobe_core::error::CoreError;

use crate::token_store::TokenStoreError;

/// Errors from the backend REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (network, DNS, timeout).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 from any endpoint. The session has already been invalidated
    /// by the time a caller sees this.
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Non-2xx, non-401 client error with the backend's detail message.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// 5xx from the backend.
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// A 2xx body that does not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Input rejected before it was sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Session(#[from] TokenStoreError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Backend-supplied message, when there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } | Self::Server { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers `{"detail": "..."}` for handled errors and
/// `{"detail": [{"msg": "...", ...}]}` for request validation failures.
/// Anything else falls back to the raw body, or to `fallback` when empty.
pub fn extract_detail(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
