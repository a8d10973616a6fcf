//! Handlers for `/diagnosis` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/diagnosis` | Body: `{"biodata"?, "disease_code"?}`; 201 with the first question |
//! | `POST`   | `/diagnosis/answer` | Body: `{"session_id", "symptom_code", "answer"}`; records and steps |
//! | `GET`    | `/diagnosis/{id}` | Re-evaluates and returns the current step |
//! | `PUT`    | `/diagnosis/{id}/answers/{symptom}` | Body: `{"answer": bool}`; records only |
//! | `DELETE` | `/diagnosis/{id}` | Purges the session; history is kept |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use somnia_core::{Diagnoser, StartRequest, StepView, session::Session, store::DiagnosisStore};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Start ───────────────────────────────────────────────────────────────────

/// `POST /diagnosis`
pub async fn start<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Json(body): Json<StartRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let outcome = diagnoser.start(body).await?;
  Ok((StatusCode::CREATED, Json(StepView::from(outcome))))
}

// ─── Answer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
  pub session_id:   Uuid,
  pub symptom_code: String,
  pub answer:       bool,
}

/// `POST /diagnosis/answer`
pub async fn answer<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Json(body): Json<AnswerBody>,
) -> Result<Json<StepView>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let outcome = diagnoser
    .answer_and_step(body.session_id, &body.symptom_code, body.answer)
    .await?;
  Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub answer: bool,
}

/// `PUT /diagnosis/{id}/answers/{symptom}`
pub async fn record<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path((id, symptom)): Path<(Uuid, String)>,
  Json(body): Json<RecordBody>,
) -> Result<Json<Session>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  Ok(Json(diagnoser.answer(id, &symptom, body.answer).await?))
}

// ─── Step ────────────────────────────────────────────────────────────────────

/// `GET /diagnosis/{id}`
pub async fn step<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StepView>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  Ok(Json(diagnoser.step(id).await?.into()))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /diagnosis/{id}`
pub async fn delete<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DiagnosisStore + 'static,
{
  diagnoser.delete_session(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
