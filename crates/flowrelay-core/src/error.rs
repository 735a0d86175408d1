//! Core error type for flowrelay.
//!
//! `ProxyError` is returned by the upstream client and by every route
//! handler. When the `axum` feature is enabled, it also implements
//! `IntoResponse` so it can be used directly as an axum handler error type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// An upstream call failed: transport error, non-2xx status, or an
    /// unreadable success body. `status` is `None` when no response arrived.
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
        details: Option<Value>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Failure before any upstream response was received.
    pub fn transport(err: reqwest::Error) -> Self {
        ProxyError::Upstream {
            status: None,
            message: format!("Upstream request failed: {}", err),
            details: None,
        }
    }

    /// Non-2xx upstream response. The body becomes `details`, parsed as JSON
    /// when possible and kept as a string otherwise.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let details = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice::<Value>(body)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
            )
        };

        ProxyError::Upstream {
            status: Some(status),
            message: format!("Upstream request failed with status code {}", status),
            details,
        }
    }

    /// Upstream status code, when the failure carried one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ProxyError::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Build the JSON envelope reported to local callers.
    pub fn envelope(&self) -> ErrorEnvelope {
        let details = match self {
            ProxyError::Upstream { details, .. } => details.clone(),
            _ => None,
        };
        ErrorEnvelope {
            error: self.to_string(),
            details,
        }
    }
}

/// Uniform JSON shape for every failed request: `{ "error": ..., "details"?: ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        // Upstream 4xx and 5xx are deliberately collapsed into one local status.
        let status = match &self {
            ProxyError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, axum::Json(self.envelope())).into_response()
    }
}

/// Extractor rejections keep their status class but take the envelope shape.
#[cfg(feature = "axum")]
fn from_rejection(status: axum::http::StatusCode, text: String) -> ProxyError {
    use axum::http::StatusCode;

    match status {
        StatusCode::PAYLOAD_TOO_LARGE => ProxyError::PayloadTooLarge(text),
        s if s.is_client_error() => ProxyError::BadRequest(text),
        _ => ProxyError::Internal(text),
    }
}

#[cfg(feature = "axum")]
impl From<axum::extract::rejection::PathRejection> for ProxyError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

#[cfg(feature = "axum")]
impl From<axum::extract::rejection::QueryRejection> for ProxyError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

#[cfg(feature = "axum")]
impl From<axum::extract::rejection::BytesRejection> for ProxyError {
    fn from(rejection: axum::extract::rejection::BytesRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}
