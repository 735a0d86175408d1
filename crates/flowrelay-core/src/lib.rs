//! flowrelay Core: transport-agnostic pieces of the workflow API proxy.
//!
//! This crate owns everything that talks to the upstream workflow-automation
//! service. It has **no HTTP server dependency** by default, so it can be used
//! from:
//!
//! - the HTTP proxy (via `flowrelay-server`)
//! - the command-line client (`flowrelay-cli`)
//! - any other embedder that wants a typed upstream client
//!
//! # Feature Flags
//!
//! - `axum`: Enables `IntoResponse` impl on `ProxyError` for use in axum handlers.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

// Convenience re-exports
pub use client::{UpstreamBody, UpstreamClient};
pub use config::UpstreamConfig;
pub use error::{ErrorEnvelope, ProxyError};
pub use models::{ExecutionFilter, ToggleRequest};
