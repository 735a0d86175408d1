//! flowrelay Server: HTTP proxy for a workflow-automation REST API.
//!
//! Every proxied route is a 1:1 passthrough to one `UpstreamClient` call:
//! the upstream body is relayed verbatim with status 200, and any failure is
//! reported as an `ErrorEnvelope`.
//!
//! This crate can be used standalone (via `flowrelay serve`) or embedded by
//! building the router with [`build_router`].

pub mod api;
pub mod state;

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::Router;
use flowrelay_core::{ProxyError, UpstreamConfig};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;

use self::state::{AppState, AppStateInner};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Largest request body accepted. Workflow definitions with many nodes and
/// pinned data run well past axum's 2 MiB default.
pub const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Configuration for the proxy server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upstream: UpstreamConfig,
}

impl ServerConfig {
    pub fn new(upstream: UpstreamConfig) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upstream,
        }
    }
}

/// Create a shared `AppState` from the upstream configuration.
pub fn create_app_state(upstream: UpstreamConfig) -> Result<AppState, ProxyError> {
    Ok(Arc::new(AppStateInner::from_config(upstream)?))
}

/// Build the complete router: proxied routes, health/info, and the
/// catch-all failure handling.
pub fn build_router(state: AppState) -> Router {
    with_middleware(api::api_router(), state)
}

/// Wrap `routes` with the fallback, body limit, panic catcher, CORS and
/// request tracing.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(CorsAny)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny);

    routes
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the proxy server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr, String> {
    // The CLI installs its own subscriber; this only covers embedders.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowrelay_core=info,flowrelay_server=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!(
        "Starting flowrelay on {}:{} (upstream: {}{})",
        config.host,
        config.port,
        config.upstream.base_url,
        config.upstream.api_prefix
    );

    let state = create_app_state(config.upstream.clone())
        .map_err(|e| format!("Failed to create upstream client: {}", e))?;

    start_server_with_state(config, state).await
}

/// Start the HTTP server with a pre-built `AppState`.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("flowrelay listening on {}", local_addr);

    // Spawn the server in a background task
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

/// Last line of defence: a panicking handler still answers with a 500 envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!("Request handler panicked: {}", detail);

    ProxyError::Internal("unexpected failure while handling request".to_string()).into_response()
}
