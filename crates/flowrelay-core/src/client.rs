//! Upstream Client: one method per upstream workflow/execution operation.
//!
//! Every method issues exactly one HTTP call under `{base_url}{api_prefix}`
//! with the static API key header attached, and hands back the upstream
//! JSON body untouched. Ids are always sent as a single percent-encoded
//! path segment.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::models::{ExecutionFilter, ToggleRequest};

/// Upstream response body, kept as the exact JSON text the upstream sent.
pub type UpstreamBody = Box<RawValue>;

/// Typed client for the upstream workflow-automation REST API.
///
/// Cheap to clone: the connection pool and configuration are shared.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
    config: Arc<UpstreamConfig>,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, ProxyError> {
        config.validate()?;

        let mut base = Url::parse(&config.url_for("")).map_err(|e| {
            ProxyError::Config(format!("invalid upstream URL '{}': {}", config.url_for(""), e))
        })?;
        if base.cannot_be_a_base() {
            return Err(ProxyError::Config(format!(
                "upstream URL '{}' cannot carry a path",
                base
            )));
        }
        base.set_query(None);
        base.set_fragment(None);

        let header_name = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(|e| {
            ProxyError::Config(format!(
                "invalid API key header name '{}': {}",
                config.api_key_header, e
            ))
        })?;
        let mut header_value = HeaderValue::from_str(&config.api_key)
            .map_err(|e| ProxyError::Config(format!("invalid API key value: {}", e)))?;
        header_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header_name, header_value);
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProxyError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    // ─── Workflows ──────────────────────────────────────────────────────────

    /// GET /workflows
    pub async fn list_workflows(&self) -> Result<UpstreamBody, ProxyError> {
        self.send(self.request(Method::GET, &["workflows"])).await
    }

    /// GET /workflows/{id}
    pub async fn get_workflow(&self, id: &str) -> Result<UpstreamBody, ProxyError> {
        let id = require_id("workflow", id)?;
        self.send(self.request(Method::GET, &["workflows", id])).await
    }

    /// POST /workflows: the definition is forwarded without local validation.
    pub async fn create_workflow(&self, workflow: &Value) -> Result<UpstreamBody, ProxyError> {
        self.send(self.request(Method::POST, &["workflows"]).json(workflow))
            .await
    }

    /// PUT /workflows/{id}
    pub async fn update_workflow(
        &self,
        id: &str,
        workflow: &Value,
    ) -> Result<UpstreamBody, ProxyError> {
        let id = require_id("workflow", id)?;
        self.send(self.request(Method::PUT, &["workflows", id]).json(workflow))
            .await
    }

    /// PATCH /workflows/{id} with `{ "active": bool }`
    pub async fn toggle_workflow(&self, id: &str, active: bool) -> Result<UpstreamBody, ProxyError> {
        let id = require_id("workflow", id)?;
        self.send(
            self.request(Method::PATCH, &["workflows", id])
                .json(&ToggleRequest { active }),
        )
        .await
    }

    /// POST /workflows/{id}/execute: `input`, when given, is the request body.
    pub async fn execute_workflow(
        &self,
        id: &str,
        input: Option<&Value>,
    ) -> Result<UpstreamBody, ProxyError> {
        let id = require_id("workflow", id)?;
        let mut request = self.request(Method::POST, &["workflows", id, "execute"]);
        if let Some(input) = input {
            request = request.json(input);
        }
        self.send(request).await
    }

    /// DELETE /workflows/{id}
    pub async fn delete_workflow(&self, id: &str) -> Result<UpstreamBody, ProxyError> {
        let id = require_id("workflow", id)?;
        self.send(self.request(Method::DELETE, &["workflows", id])).await
    }

    // ─── Executions ─────────────────────────────────────────────────────────

    /// GET /executions/{id}
    pub async fn get_execution(&self, id: &str) -> Result<UpstreamBody, ProxyError> {
        let id = require_id("execution", id)?;
        self.send(self.request(Method::GET, &["executions", id])).await
    }

    /// GET /executions, with the filter as query parameters when any are set.
    pub async fn list_executions(
        &self,
        filter: &ExecutionFilter,
    ) -> Result<UpstreamBody, ProxyError> {
        let mut request = self.request(Method::GET, &["executions"]);
        if !filter.is_empty() {
            request = request.query(filter);
        }
        self.send(request).await
    }

    // ─── Transport ──────────────────────────────────────────────────────────

    /// Upstream URL for `segments`, each appended as one encoded path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `base` was checked in `new`, so it always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!("Upstream {} {}", method, url);
        self.http.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<UpstreamBody, ProxyError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Upstream request failed: {}", e);
            ProxyError::transport(e)
        })?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upstream response from {}: {}", url, e);
            ProxyError::transport(e)
        })?;

        if !status.is_success() {
            tracing::warn!("Upstream {} returned {}", url, status);
            return Err(ProxyError::from_status(status.as_u16(), &body));
        }

        parse_body(status.as_u16(), &body)
    }
}

/// Turn a 2xx body into raw JSON. An empty body relays as `null`.
fn parse_body(status: u16, body: &[u8]) -> Result<UpstreamBody, ProxyError> {
    let text = if body.iter().all(u8::is_ascii_whitespace) {
        "null".to_string()
    } else {
        String::from_utf8(body.to_vec()).map_err(|e| ProxyError::Upstream {
            status: Some(status),
            message: format!("Upstream returned a body that is not UTF-8: {}", e),
            details: None,
        })?
    };

    RawValue::from_string(text).map_err(|e| ProxyError::Upstream {
        status: Some(status),
        message: format!("Upstream returned a non-JSON body: {}", e),
        details: Some(Value::String(String::from_utf8_lossy(body).into_owned())),
    })
}

/// Ids travel as one path segment. `.` and `..` cannot: URL parsers
/// collapse them, so they are refused instead of rewritten.
fn require_id<'a>(kind: &str, id: &'a str) -> Result<&'a str, ProxyError> {
    if id.is_empty() {
        return Err(ProxyError::BadRequest(format!("{} id must not be empty", kind)));
    }
    if id == "." || id == ".." {
        return Err(ProxyError::BadRequest(format!(
            "{} id '{}' cannot be used as a path segment",
            kind, id
        )));
    }
    Ok(id)
}
