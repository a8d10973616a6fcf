//! Error type for `somnia-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain failure detected by the store (missing row, stale version,
  /// invalid input).
  #[error(transparent)]
  Core(#[from] somnia_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("decode error: {0}")]
  Decode(String),
}

impl From<Error> for somnia_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      other => Self::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
