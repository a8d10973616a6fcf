//! Handlers for `/history` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/history` | Newest first; optional `?limit=&offset=` |
//! | `GET`  | `/history/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use somnia_core::{
  Diagnoser, Error,
  history::HistoryEntry,
  store::{DiagnosisStore, HistoryQuery, ResultExt as _},
};

use crate::error::ApiError;

/// Upper bound on `?limit=`.
pub const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /history[?limit=...][&offset=...]`
pub async fn list<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  if params.limit.is_some_and(|l| !(1..=MAX_LIMIT).contains(&l)) {
    return Err(ApiError::BadRequest(format!(
      "limit must be between 1 and {MAX_LIMIT}"
    )));
  }

  let query = HistoryQuery { limit: params.limit, offset: params.offset };
  let entries = diagnoser.store().list_history(&query).await.into_core()?;
  Ok(Json(entries))
}

/// `GET /history/{id}`
pub async fn get_one<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(id): Path<i64>,
) -> Result<Json<HistoryEntry>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let entry = diagnoser
    .store()
    .get_history(id)
    .await
    .into_core()?
    .ok_or(Error::HistoryNotFound(id))?;
  Ok(Json(entry))
}
