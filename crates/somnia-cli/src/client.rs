//! Async HTTP client wrapping the Somnia JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use somnia_core::{StartRequest, StepView, engine::DiseaseDetail, history::HistoryEntry};
use uuid::Uuid;

/// Connection settings for the Somnia API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the Somnia JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Diagnosis ─────────────────────────────────────────────────────────────

  /// `POST /api/diagnosis`
  pub async fn start(&self, request: &StartRequest) -> Result<StepView> {
    let resp = self
      .client
      .post(self.url("/diagnosis"))
      .json(request)
      .send()
      .await
      .context("POST /diagnosis failed")?;
    decode(resp, "POST /diagnosis").await
  }

  /// `POST /api/diagnosis/answer`
  pub async fn answer(&self, session_id: Uuid, symptom_code: &str, answer: bool) -> Result<StepView> {
    let resp = self
      .client
      .post(self.url("/diagnosis/answer"))
      .json(&json!({
        "session_id": session_id,
        "symptom_code": symptom_code,
        "answer": answer,
      }))
      .send()
      .await
      .context("POST /diagnosis/answer failed")?;
    decode(resp, "POST /diagnosis/answer").await
  }

  // ── Knowledge base ────────────────────────────────────────────────────────

  /// `GET /api/diseases`
  pub async fn list_diseases(&self) -> Result<Vec<DiseaseDetail>> {
    let resp = self
      .client
      .get(self.url("/diseases"))
      .send()
      .await
      .context("GET /diseases failed")?;
    decode(resp, "GET /diseases").await
  }

  // ── History ───────────────────────────────────────────────────────────────

  /// `GET /api/history?limit=<n>`
  pub async fn list_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
    let resp = self
      .client
      .get(self.url("/history"))
      .query(&[("limit", limit.to_string())])
      .send()
      .await
      .context("GET /history failed")?;
    decode(resp, "GET /history").await
  }
}

/// Deserialize a success body, or surface the server's `{"error": ...}`.
async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v["error"].as_str().map(str::to_owned))
      .unwrap_or_default();
    return Err(anyhow!("{what} → {status} {message}"));
  }
  resp.json().await.with_context(|| format!("deserialising {what} response"))
}
