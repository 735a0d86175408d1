//! Upstream connection settings and `.env` loading.

use std::path::{Path, PathBuf};

use crate::error::ProxyError;

/// Version prefix every upstream resource lives under.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Header carrying the static API key on every upstream request.
pub const DEFAULT_API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Configuration for the upstream workflow-automation API.
///
/// Immutable once the client is built; clone it freely.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Scheme + host (+ optional path) of the upstream service, no trailing slash.
    pub base_url: String,
    /// Static API key forwarded on every request.
    pub api_key: String,
    /// Fixed version prefix, e.g. `/api/v1`.
    pub api_prefix: String,
    /// Name of the header that carries `api_key`.
    pub api_key_header: String,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        self.api_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Full upstream URL for a resource path such as `/workflows/42`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    /// Reject settings that can never produce a working client.
    pub fn validate(&self) -> Result<(), ProxyError> {
        if self.base_url.is_empty() {
            return Err(ProxyError::Config("upstream base URL is not set".to_string()));
        }

        let parsed = reqwest::Url::parse(&self.base_url).map_err(|e| {
            ProxyError::Config(format!("invalid upstream base URL '{}': {}", self.base_url, e))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ProxyError::Config(format!(
                "upstream base URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.api_key.is_empty() {
            return Err(ProxyError::Config("upstream API key is not set".to_string()));
        }
        if self.api_key_header.is_empty() {
            return Err(ProxyError::Config("API key header name is empty".to_string()));
        }

        Ok(())
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_prefix", &self.api_prefix)
            .field("api_key_header", &self.api_key_header)
            .finish()
    }
}

/// Load `.env.local` and `.env` from the current directory, returning the
/// files that were read.
///
/// Variables already present in the process environment are never overridden.
/// Nothing is logged here; the caller may not have a tracing subscriber yet.
pub fn load_dotenv() -> Vec<PathBuf> {
    load_dotenv_from(Path::new("."))
}

/// Same as [`load_dotenv`], reading the files from `dir`.
pub fn load_dotenv_from(dir: &Path) -> Vec<PathBuf> {
    let mut loaded = Vec::new();
    // .env.local first, so its values win over .env
    for filename in &[".env.local", ".env"] {
        let path = dir.join(filename);
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };

        for (key, value) in parse_dotenv(&content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(&key, &value);
            }
        }
        loaded.push(path);
    }
    loaded
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments and stripping
/// one layer of matching quotes.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some(eq_idx) = line.find('=') {
            let key = line[..eq_idx].trim();
            if key.is_empty() {
                continue;
            }
            let mut value = line[eq_idx + 1..].trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            pairs.push((key.to_string(), value));
        }
    }
    pairs
}
