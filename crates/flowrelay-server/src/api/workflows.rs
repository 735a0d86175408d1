//! Workflow routes - /workflows
//!
//! GET    /workflows              - List workflows
//! POST   /workflows              - Create a workflow
//! GET    /workflows/{id}         - Get a workflow
//! PUT    /workflows/{id}         - Replace a workflow
//! PATCH  /workflows/{id}         - Toggle a workflow with `{ "active": bool }`
//! DELETE /workflows/{id}         - Delete a workflow
//! POST   /workflows/{id}/execute - Run a workflow with an optional input body

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use flowrelay_core::{ProxyError, ToggleRequest, UpstreamBody};

use super::parse_json_body;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_workflows).post(create_workflow))
        .route(
            "/{id}",
            get(get_workflow)
                .put(update_workflow)
                .patch(toggle_workflow)
                .delete(delete_workflow),
        )
        .route("/{id}/execute", post(execute_workflow))
}

async fn list_workflows(
    State(state): State<AppState>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    state.client.list_workflows().await.map(Json)
}

async fn get_workflow(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let Path(id) = path?;
    state.client.get_workflow(&id).await.map(Json)
}

async fn create_workflow(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let body = body?;
    let workflow = parse_json_body(&body)?.unwrap_or_else(|| serde_json::json!({}));
    state.client.create_workflow(&workflow).await.map(Json)
}

async fn update_workflow(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let Path(id) = path?;
    let body = body?;
    let workflow = parse_json_body(&body)?.unwrap_or_else(|| serde_json::json!({}));
    state.client.update_workflow(&id, &workflow).await.map(Json)
}

async fn toggle_workflow(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let Path(id) = path?;
    let body = body?;
    let payload = parse_json_body(&body)?
        .ok_or_else(|| ProxyError::BadRequest("missing body, expected {\"active\": bool}".to_string()))?;
    let toggle: ToggleRequest = serde_json::from_value(payload).map_err(|e| {
        ProxyError::BadRequest(format!("expected {{\"active\": bool}}: {}", e))
    })?;

    tracing::info!("Setting workflow {} active={}", id, toggle.active);
    state.client.toggle_workflow(&id, toggle.active).await.map(Json)
}

async fn delete_workflow(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let Path(id) = path?;
    state.client.delete_workflow(&id).await.map(Json)
}

async fn execute_workflow(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let Path(id) = path?;
    let body = body?;
    let input = parse_json_body(&body)?;

    tracing::info!("Executing workflow {}", id);
    state
        .client
        .execute_workflow(&id, input.as_ref())
        .await
        .map(Json)
}
