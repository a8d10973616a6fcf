//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Biodata is stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings. Status
//! enums are stored as their snake_case names.

use chrono::{DateTime, Utc};
use somnia_core::{
  history::{HistoryEntry, HistoryStatus},
  knowledge::{Disease, Rule, Solution, Symptom},
  session::{Answer, Biodata, SearchMode, Session, SessionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Status enums ─────────────────────────────────────────────────────────────

pub fn encode_session_status(s: SessionStatus) -> &'static str { s.into() }

pub fn decode_session_status(s: &str) -> Result<SessionStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown session status: {s:?}")))
}

pub fn encode_history_status(s: HistoryStatus) -> &'static str { s.into() }

pub fn decode_history_status(s: &str) -> Result<HistoryStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown history status: {s:?}")))
}

// ─── Biodata ──────────────────────────────────────────────────────────────────

pub fn encode_biodata(b: Option<&Biodata>) -> Result<Option<String>> {
  Ok(b.map(serde_json::to_string).transpose()?)
}

pub fn decode_biodata(s: Option<&str>) -> Result<Option<Biodata>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

// ─── Plain rows ──────────────────────────────────────────────────────────────

pub const DISEASE_COLUMNS: &str = "code, name, description, priority";

pub fn disease_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Disease> {
  Ok(Disease {
    code:        row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    priority:    row.get(3)?,
  })
}

pub fn symptom_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Symptom> {
  Ok(Symptom { code: row.get(0)?, question: row.get(1)? })
}

pub const RULE_COLUMNS: &str = "rule_id, disease_code, symptom_code, sort_order";

pub fn rule_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Rule> {
  Ok(Rule {
    rule_id:      row.get(0)?,
    disease_code: row.get(1)?,
    symptom_code: row.get(2)?,
    sort_order:   row.get(3)?,
  })
}

pub const SOLUTION_COLUMNS: &str = "solution_id, disease_code, sort_order, text";

pub fn solution_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Solution> {
  Ok(Solution {
    solution_id:  row.get(0)?,
    disease_code: row.get(1)?,
    sort_order:   row.get(2)?,
    text:         row.get(3)?,
  })
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const SESSION_COLUMNS: &str = "session_id, status, target_disease_code, biodata, \
  current_disease_code, result_disease_code, version, created_at, updated_at";

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub session_id:           String,
  pub status:               String,
  pub target_disease_code:  Option<String>,
  pub biodata:              Option<String>,
  pub current_disease_code: Option<String>,
  pub result_disease_code:  Option<String>,
  pub version:              i64,
  pub created_at:           String,
  pub updated_at:           String,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:           row.get(0)?,
      status:               row.get(1)?,
      target_disease_code:  row.get(2)?,
      biodata:              row.get(3)?,
      current_disease_code: row.get(4)?,
      result_disease_code:  row.get(5)?,
      version:              row.get(6)?,
      created_at:           row.get(7)?,
      updated_at:           row.get(8)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    let mode = match self.target_disease_code {
      Some(disease_code) => SearchMode::SingleHypothesis { disease_code },
      None => SearchMode::FreeSearch,
    };

    Ok(Session {
      session_id:           decode_uuid(&self.session_id)?,
      status:               decode_session_status(&self.status)?,
      mode,
      biodata:              decode_biodata(self.biodata.as_deref())?,
      current_disease_code: self.current_disease_code,
      result_disease_code:  self.result_disease_code,
      version:              self.version,
      created_at:           decode_dt(&self.created_at)?,
      updated_at:           decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from an `answers` row.
pub struct RawAnswer {
  pub session_id:   String,
  pub symptom_code: String,
  pub value:        bool,
  pub answered_at:  String,
}

impl RawAnswer {
  pub fn into_answer(self) -> Result<Answer> {
    Ok(Answer {
      session_id:   decode_uuid(&self.session_id)?,
      symptom_code: self.symptom_code,
      value:        self.value,
      answered_at:  decode_dt(&self.answered_at)?,
    })
  }
}

pub const HISTORY_COLUMNS: &str = "history_id, session_id, biodata, status, \
  disease_code, disease_name, message, recorded_at";

/// Raw values read directly from a `history` row.
pub struct RawHistory {
  pub history_id:   i64,
  pub session_id:   String,
  pub biodata:      Option<String>,
  pub status:       String,
  pub disease_code: Option<String>,
  pub disease_name: Option<String>,
  pub message:      String,
  pub recorded_at:  String,
}

impl RawHistory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      history_id:   row.get(0)?,
      session_id:   row.get(1)?,
      biodata:      row.get(2)?,
      status:       row.get(3)?,
      disease_code: row.get(4)?,
      disease_name: row.get(5)?,
      message:      row.get(6)?,
      recorded_at:  row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      history_id:   self.history_id,
      session_id:   decode_uuid(&self.session_id)?,
      biodata:      decode_biodata(self.biodata.as_deref())?,
      status:       decode_history_status(&self.status)?,
      disease_code: self.disease_code,
      disease_name: self.disease_name,
      message:      self.message,
      recorded_at:  decode_dt(&self.recorded_at)?,
    })
  }
}
