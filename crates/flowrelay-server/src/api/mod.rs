pub mod executions;
pub mod meta;
pub mod workflows;

use axum::body::Bytes;
use axum::http::{Method, Uri};
use axum::Router;
use flowrelay_core::ProxyError;
use serde_json::Value;

use crate::state::AppState;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(meta::router())
        .nest("/workflows", workflows::router())
        .nest("/executions", executions::router())
}

/// Router fallback: unknown routes still answer with an `ErrorEnvelope`.
pub async fn not_found(method: Method, uri: Uri) -> ProxyError {
    ProxyError::NotFound(format!("{} {}", method, uri.path()))
}

/// Parse an optional JSON request body. An empty body is `None`.
pub(crate) fn parse_json_body(body: &Bytes) -> Result<Option<Value>, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ProxyError::BadRequest(format!("invalid JSON body: {}", e)))
}
