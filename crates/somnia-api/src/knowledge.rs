//! Knowledge-base administration: `/diseases`, `/symptoms`, `/rules`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/diseases` | Search order, each with its required symptom codes |
//! | `POST`   | `/diseases` | Body: `{"code","name","description"?,"priority"?}` |
//! | `GET`    | `/diseases/{code}` | 404 if not found |
//! | `PUT`    | `/diseases/{code}` | Body: `{"name","description"?,"priority"?}` |
//! | `DELETE` | `/diseases/{code}` | Cascades rules and solutions |
//! | `PUT`    | `/diseases/{code}/symptoms` | Body: `{"symptoms":["G01",...]}`; replaces the rule set |
//! | `GET`    | `/diseases/{code}/solutions` | |
//! | `PUT`    | `/diseases/{code}/solutions` | Body: `{"solutions":["...",...]}` |
//! | `GET`    | `/symptoms` | Ordered by code |
//! | `POST`   | `/symptoms` | Body: `{"code","question"}` |
//! | `GET`    | `/symptoms/{code}` | |
//! | `PUT`    | `/symptoms/{code}` | Body: `{"question"}` |
//! | `DELETE` | `/symptoms/{code}` | Cascades rules |
//! | `GET`    | `/rules` | Disease code → ordered symptom codes |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use somnia_core::{
  Diagnoser, Error,
  engine::DiseaseDetail,
  knowledge::{Disease, DiseaseUpdate, Hypothesis, KnowledgeBase, Rule, Solution, Symptom},
  store::{DiagnosisStore, ResultExt as _},
};

use crate::error::ApiError;

fn detail(h: &Hypothesis) -> DiseaseDetail {
  DiseaseDetail {
    disease:  h.disease.clone(),
    symptoms: h.required.clone(),
  }
}

// ─── Diseases ────────────────────────────────────────────────────────────────

/// `GET /diseases`
pub async fn list_diseases<S>(
  State(diagnoser): State<Diagnoser<S>>,
) -> Result<Json<Vec<DiseaseDetail>>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let kb = KnowledgeBase::load(diagnoser.store()).await?;
  Ok(Json(kb.hypotheses().iter().map(detail).collect()))
}

/// `POST /diseases`
pub async fn create_disease<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Json(body): Json<Disease>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let disease = diagnoser.store().create_disease(body).await.into_core()?;
  tracing::info!(disease = %disease.code, "disease created");
  Ok((StatusCode::CREATED, Json(disease)))
}

/// `GET /diseases/{code}`
pub async fn get_disease<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
) -> Result<Json<DiseaseDetail>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let kb = KnowledgeBase::load(diagnoser.store()).await?;
  let found = kb
    .hypothesis(&code)
    .map(detail)
    .ok_or(Error::DiseaseNotFound(code))?;
  Ok(Json(found))
}

/// `PUT /diseases/{code}`
pub async fn update_disease<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
  Json(body): Json<DiseaseUpdate>,
) -> Result<Json<Disease>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let disease = diagnoser
    .store()
    .update_disease(&code, body)
    .await
    .into_core()?;
  Ok(Json(disease))
}

/// `DELETE /diseases/{code}`
pub async fn delete_disease<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DiagnosisStore + 'static,
{
  diagnoser.store().delete_disease(&code).await.into_core()?;
  tracing::info!(disease = %code, "disease deleted");
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RulesBody {
  pub symptoms: Vec<String>,
}

/// `PUT /diseases/{code}/symptoms`
pub async fn set_rules<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
  Json(body): Json<RulesBody>,
) -> Result<Json<Vec<Rule>>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let rules = diagnoser
    .store()
    .set_rules(&code, body.symptoms)
    .await
    .into_core()?;
  tracing::info!(disease = %code, rules = rules.len(), "rule set replaced");
  Ok(Json(rules))
}

/// `GET /diseases/{code}/solutions`
pub async fn list_solutions<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
) -> Result<Json<Vec<Solution>>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let store = diagnoser.store();
  if store.get_disease(&code).await.into_core()?.is_none() {
    return Err(Error::DiseaseNotFound(code).into());
  }
  Ok(Json(store.list_solutions(&code).await.into_core()?))
}

#[derive(Debug, Deserialize)]
pub struct SolutionsBody {
  pub solutions: Vec<String>,
}

/// `PUT /diseases/{code}/solutions`
pub async fn set_solutions<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
  Json(body): Json<SolutionsBody>,
) -> Result<Json<Vec<Solution>>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let solutions = diagnoser
    .store()
    .set_solutions(&code, body.solutions)
    .await
    .into_core()?;
  Ok(Json(solutions))
}

// ─── Symptoms ────────────────────────────────────────────────────────────────

/// `GET /symptoms`
pub async fn list_symptoms<S>(
  State(diagnoser): State<Diagnoser<S>>,
) -> Result<Json<Vec<Symptom>>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  Ok(Json(diagnoser.store().list_symptoms().await.into_core()?))
}

/// `POST /symptoms`
pub async fn create_symptom<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Json(body): Json<Symptom>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let symptom = diagnoser.store().create_symptom(body).await.into_core()?;
  Ok((StatusCode::CREATED, Json(symptom)))
}

/// `GET /symptoms/{code}`
pub async fn get_symptom<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
) -> Result<Json<Symptom>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let symptom = diagnoser
    .store()
    .get_symptom(&code)
    .await
    .into_core()?
    .ok_or(Error::SymptomNotFound(code))?;
  Ok(Json(symptom))
}

#[derive(Debug, Deserialize)]
pub struct QuestionBody {
  pub question: String,
}

/// `PUT /symptoms/{code}`
pub async fn update_symptom<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
  Json(body): Json<QuestionBody>,
) -> Result<Json<Symptom>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let symptom = diagnoser
    .store()
    .update_symptom(&code, body.question)
    .await
    .into_core()?;
  Ok(Json(symptom))
}

/// `DELETE /symptoms/{code}`
pub async fn delete_symptom<S>(
  State(diagnoser): State<Diagnoser<S>>,
  Path(code): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DiagnosisStore + 'static,
{
  diagnoser.store().delete_symptom(&code).await.into_core()?;
  tracing::info!(symptom = %code, "symptom deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// `GET /rules`
pub async fn list_rules<S>(
  State(diagnoser): State<Diagnoser<S>>,
) -> Result<Json<BTreeMap<String, Vec<String>>>, ApiError>
where
  S: DiagnosisStore + 'static,
{
  let kb = KnowledgeBase::load(diagnoser.store()).await?;
  let rules = kb
    .hypotheses()
    .iter()
    .map(|h| (h.disease.code.clone(), h.required.clone()))
    .collect();
  Ok(Json(rules))
}
