//! Non-proxied routes: health check and API description.

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};

use crate::state::AppState;

pub const SERVICE_NAME: &str = "flowrelay";

/// Documented route keys served by `GET /`. Independent of upstream state.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("health", "GET /health"),
    ("info", "GET /"),
    ("listWorkflows", "GET /workflows"),
    ("getWorkflow", "GET /workflows/:id"),
    ("createWorkflow", "POST /workflows"),
    ("updateWorkflow", "PUT /workflows/:id"),
    ("toggleWorkflow", "PATCH /workflows/:id"),
    ("deleteWorkflow", "DELETE /workflows/:id"),
    ("executeWorkflow", "POST /workflows/:id/execute"),
    ("getExecution", "GET /executions/:id"),
    ("listExecutions", "GET /executions?workflowId="),
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_info() -> Json<Value> {
    let endpoints: Map<String, Value> = ENDPOINTS
        .iter()
        .map(|(key, route)| (key.to_string(), Value::String(route.to_string())))
        .collect();

    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Proxy for the upstream workflow-automation REST API",
        "endpoints": endpoints,
    }))
}
