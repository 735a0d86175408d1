//! Shared application state for the axum server.

use std::sync::Arc;

use flowrelay_core::{ProxyError, UpstreamClient, UpstreamConfig};

/// State accessible by all route handlers. Immutable after startup.
pub struct AppStateInner {
    pub client: UpstreamClient,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: UpstreamConfig) -> Result<Self, ProxyError> {
        Ok(Self::new(UpstreamClient::new(config)?))
    }
}
