//! Diagnosis sessions and the answers recorded against them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

/// Where a session is in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
  /// Questions are still being asked.
  Asking,
  /// Concluded, either with a proven disease or with no match.
  Done,
  /// The pre-selected disease was rejected by a negative answer.
  Unsatisfied,
}

impl SessionStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Asking) }
}

/// Which hypotheses a session may conclude.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchMode {
  /// Walk every disease in knowledge-base order.
  #[default]
  FreeSearch,
  /// Test one disease chosen up front; never fall through to others.
  SingleHypothesis { disease_code: String },
}

impl SearchMode {
  pub fn target(&self) -> Option<&str> {
    match self {
      Self::FreeSearch => None,
      Self::SingleHypothesis { disease_code } => Some(disease_code),
    }
  }
}

/// Optional personal details carried into the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biodata {
  pub name:    String,
  pub age:     u32,
  pub gender:  String,
  #[serde(default)]
  pub address: String,
}

impl Biodata {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyField("biodata name"));
    }
    if self.gender.trim().is_empty() {
      return Err(Error::EmptyField("biodata gender"));
    }
    Ok(())
  }
}

/// One diagnosis attempt.
///
/// `version` is bumped on every write and checked by
/// [`DiagnosisStore::persist_session`](crate::store::DiagnosisStore::persist_session)
/// so two requests racing on one session cannot both win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub session_id:           Uuid,
  pub status:               SessionStatus,
  pub mode:                 SearchMode,
  pub biodata:              Option<Biodata>,
  /// The hypothesis under test (or the one concluded / rejected).
  pub current_disease_code: Option<String>,
  /// Set only when a disease was proven.
  pub result_disease_code:  Option<String>,
  pub version:              i64,
  pub created_at:           DateTime<Utc>,
  pub updated_at:           DateTime<Utc>,
}

/// Input for [`DiagnosisStore::create_session`](crate::store::DiagnosisStore::create_session).
#[derive(Debug, Clone, Default)]
pub struct NewSession {
  pub mode:                 SearchMode,
  pub biodata:              Option<Biodata>,
  pub current_disease_code: Option<String>,
}

/// A recorded yes/no answer. Unique per `(session_id, symptom_code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
  pub session_id:   Uuid,
  pub symptom_code: String,
  pub value:        bool,
  pub answered_at:  DateTime<Utc>,
}

/// Working memory: symptom code → answer.
pub type AnswerMap = HashMap<String, bool>;

pub fn answer_map(answers: &[Answer]) -> AnswerMap {
  answers
    .iter()
    .map(|a| (a.symptom_code.clone(), a.value))
    .collect()
}
