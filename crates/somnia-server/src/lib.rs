//! HTTP server assembly for Somnia.
//!
//! Wires a [`DiagnosisStore`] into the JSON API under `/api` and adds request
//! tracing. The binary in `main.rs` handles configuration and startup.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use somnia_core::{Diagnoser, store::DiagnosisStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SOMNIA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  /// Fill empty knowledge-base tables from the bundled data on startup.
  #[serde(default = "default_seed")]
  pub seed_on_start: bool,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("somnia.db") }
fn default_seed() -> bool { true }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router for `store`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: DiagnosisStore + 'static,
{
  Router::new()
    .nest("/api", somnia_api::api_router(Diagnoser::new(store)))
    .layer(TraceLayer::new_for_http())
}
