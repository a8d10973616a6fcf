//! The append-only history log of finished sessions.
//!
//! Entries are denormalized snapshots: the disease name and biodata are
//! copied by value, so later edits to the knowledge base or purging the
//! session never alter what was recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::info;
use uuid::Uuid;

use crate::{
  Result,
  knowledge::Disease,
  session::{Biodata, Session},
  store::{DiagnosisStore, ResultExt as _},
};

/// The outcome a history entry records.
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
pub enum HistoryStatus {
  Completed,
  NoMatch,
  Unsatisfied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub history_id:   i64,
  /// Informational only; the session may since have been purged.
  pub session_id:   Uuid,
  pub biodata:      Option<Biodata>,
  pub status:       HistoryStatus,
  pub disease_code: Option<String>,
  pub disease_name: Option<String>,
  pub message:      String,
  pub recorded_at:  DateTime<Utc>,
}

/// Input for [`DiagnosisStore::conclude_session`].
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
  pub session_id:   Uuid,
  pub biodata:      Option<Biodata>,
  pub status:       HistoryStatus,
  pub disease_code: Option<String>,
  pub disease_name: Option<String>,
  pub message:      String,
}

impl NewHistoryEntry {
  /// Snapshot `session` and `disease` as they are right now.
  ///
  /// When the disease record is gone the code recorded on the session is
  /// kept and doubles as the name.
  pub fn snapshot(
    session: &Session,
    status: HistoryStatus,
    disease: Option<&Disease>,
    message: impl Into<String>,
  ) -> Self {
    let disease_code = disease
      .map(|d| d.code.clone())
      .or_else(|| session.current_disease_code.clone());
    let disease_name = disease
      .map(|d| d.name.clone())
      .or_else(|| disease_code.clone());

    Self {
      session_id: session.session_id,
      biodata: session.biodata.clone(),
      status,
      disease_code,
      disease_name,
      message: message.into(),
    }
  }
}

/// Commit `session`'s terminal transition together with a snapshot of it.
///
/// `session` must already carry its terminal status. Either both writes land
/// or neither does, so a session is never terminal without its entry.
pub async fn record<S: DiagnosisStore>(
  store: &S,
  session: &Session,
  status: HistoryStatus,
  disease: Option<&Disease>,
  message: impl Into<String>,
) -> Result<(Session, HistoryEntry)> {
  let entry = NewHistoryEntry::snapshot(session, status, disease, message);
  let (session, entry) = store.conclude_session(session, entry).await.into_core()?;
  info!(
    history_id = entry.history_id,
    session_id = %entry.session_id,
    status = %entry.status,
    "recorded diagnosis history"
  );
  Ok((session, entry))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::{SearchMode, SessionStatus};

  fn session() -> Session {
    Session {
      session_id:           Uuid::new_v4(),
      status:               SessionStatus::Done,
      mode:                 SearchMode::FreeSearch,
      biodata:              Some(Biodata {
        name:    "Budi".into(),
        age:     30,
        gender:  "male".into(),
        address: "Bandung".into(),
      }),
      current_disease_code: Some("P01".into()),
      result_disease_code:  Some("P01".into()),
      version:              3,
      created_at:           Utc::now(),
      updated_at:           Utc::now(),
    }
  }

  #[test]
  fn snapshot_copies_disease_name_and_biodata() {
    let s = session();
    let disease = Disease {
      code:        "P01".into(),
      name:        "Insomnia".into(),
      description: String::new(),
      priority:    10,
    };
    let entry = NewHistoryEntry::snapshot(&s, HistoryStatus::Completed, Some(&disease), "ok");
    assert_eq!(entry.disease_name.as_deref(), Some("Insomnia"));
    assert_eq!(entry.disease_code.as_deref(), Some("P01"));
    assert_eq!(entry.biodata, s.biodata);
    assert_eq!(entry.session_id, s.session_id);
  }

  #[test]
  fn snapshot_without_disease_falls_back_to_session_code() {
    let mut s = session();
    let entry = NewHistoryEntry::snapshot(&s, HistoryStatus::Unsatisfied, None, "gone");
    assert_eq!(entry.disease_name.as_deref(), Some("P01"));

    s.current_disease_code = None;
    let entry = NewHistoryEntry::snapshot(&s, HistoryStatus::NoMatch, None, "none");
    assert_eq!(entry.disease_code, None);
    assert_eq!(entry.disease_name, None);
  }
}
