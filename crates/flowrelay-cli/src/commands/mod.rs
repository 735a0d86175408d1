//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command. Direct commands
//! reuse the same `UpstreamClient` the proxy routes call.

pub mod execution;
pub mod server;
pub mod workflow;

use clap::Args;
use flowrelay_core::config::{DEFAULT_API_KEY_HEADER, DEFAULT_API_PREFIX};
use flowrelay_core::{ProxyError, UpstreamBody, UpstreamClient, UpstreamConfig};

/// Upstream connection flags, shared by every command.
#[derive(Clone, Args)]
pub struct UpstreamArgs {
    /// Base URL of the upstream workflow service (e.g. http://localhost:5678)
    #[arg(long, env = "UPSTREAM_BASE_URL", global = true)]
    pub upstream_url: Option<String>,

    /// API key sent with every upstream request
    #[arg(long, env = "UPSTREAM_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Version prefix of the upstream API
    #[arg(long, env = "UPSTREAM_API_PREFIX", default_value = DEFAULT_API_PREFIX, global = true)]
    pub api_prefix: String,

    /// Header name that carries the API key
    #[arg(long, env = "UPSTREAM_API_KEY_HEADER", default_value = DEFAULT_API_KEY_HEADER, global = true)]
    pub api_key_header: String,
}

impl UpstreamArgs {
    /// Resolve the flags into a validated `UpstreamConfig`.
    pub fn to_config(&self) -> Result<UpstreamConfig, String> {
        let base_url = self
            .upstream_url
            .as_deref()
            .ok_or("Missing upstream URL: pass --upstream-url or set UPSTREAM_BASE_URL")?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or("Missing API key: pass --api-key or set UPSTREAM_API_KEY")?;

        let config = UpstreamConfig::new(base_url, api_key)
            .with_api_prefix(self.api_prefix.as_str())
            .with_api_key_header(self.api_key_header.as_str());
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// Build an `UpstreamClient` for direct commands.
    pub fn client(&self) -> Result<UpstreamClient, String> {
        UpstreamClient::new(self.to_config()?).map_err(|e| e.to_string())
    }
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Pretty-print an upstream body, falling back to its raw text.
pub fn print_body(body: &UpstreamBody) {
    match serde_json::from_str::<serde_json::Value>(body.get()) {
        Ok(value) => print_json(&value),
        Err(_) => println!("{}", body.get()),
    }
}

/// Render an upstream failure for the terminal, including the upstream body.
pub fn upstream_error(err: ProxyError) -> String {
    let envelope = err.envelope();
    match envelope.details {
        Some(details) => format!("{} ({})", envelope.error, details),
        None => envelope.error,
    }
}
