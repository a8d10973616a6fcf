//! Error types for `somnia-core`.

use thiserror::Error;
use uuid::Uuid;

/// Broad classes of failure, used by transports to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Validation,
  Misconfiguration,
  Conflict,
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("disease not found: {0}")]
  DiseaseNotFound(String),

  #[error("symptom not found: {0}")]
  SymptomNotFound(String),

  #[error("history entry not found: {0}")]
  HistoryNotFound(i64),

  #[error("invalid {kind} code {code:?}: expected {expected}")]
  InvalidCode {
    kind:     &'static str,
    code:     String,
    expected: &'static str,
  },

  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("{0} is out of range")]
  OutOfRange(&'static str),

  #[error("disease {0} already exists")]
  DuplicateDisease(String),

  #[error("symptom {0} already exists")]
  DuplicateSymptom(String),

  #[error("rule for {disease} references unknown symptom {symptom}")]
  UnknownRuleSymptom { disease: String, symptom: String },

  #[error("rule for {disease} lists symptom {symptom} more than once")]
  DuplicateRuleSymptom { disease: String, symptom: String },

  #[error("disease {0} has no required symptoms")]
  EmptyRuleSet(String),

  #[error("no question available; check the rule data")]
  NoQuestion,

  #[error("session {0} was modified concurrently")]
  Conflict(Uuid),

  #[error("session {0} is unsatisfied but names no disease")]
  CorruptSession(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::SessionNotFound(_)
      | Self::DiseaseNotFound(_)
      | Self::SymptomNotFound(_)
      | Self::HistoryNotFound(_) => ErrorKind::NotFound,
      Self::InvalidCode { .. }
      | Self::EmptyField(_)
      | Self::OutOfRange(_)
      | Self::DuplicateDisease(_)
      | Self::DuplicateSymptom(_)
      | Self::UnknownRuleSymptom { .. }
      | Self::DuplicateRuleSymptom { .. } => ErrorKind::Validation,
      Self::EmptyRuleSet(_) | Self::NoQuestion => ErrorKind::Misconfiguration,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::CorruptSession(_) | Self::Store(_) => ErrorKind::Internal,
    }
  }

  /// Box an arbitrary backend failure.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
