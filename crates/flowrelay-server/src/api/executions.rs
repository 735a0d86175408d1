//! Execution routes - /executions
//!
//! GET /executions?workflowId=&status=&limit= - List executions
//! GET /executions/{id}                       - Get one execution

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use flowrelay_core::{ExecutionFilter, ProxyError, UpstreamBody};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_executions))
        .route("/{id}", get(get_execution))
}

async fn list_executions(
    State(state): State<AppState>,
    query: Result<Query<ExecutionFilter>, QueryRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let Query(filter) = query?;
    state.client.list_executions(&filter).await.map(Json)
}

async fn get_execution(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UpstreamBody>, ProxyError> {
    let Path(id) = path?;
    state.client.get_execution(&id).await.map(Json)
}
