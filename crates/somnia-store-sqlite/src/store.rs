//! [`SqliteStore`]: the SQLite implementation of [`DiagnosisStore`].
//!
//! Multi-statement writes run inside a transaction on the connection thread.
//! Domain failures found inside a transaction are returned as the inner
//! `Err` of a nested result, which rolls the transaction back on drop.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use somnia_core::{
  Error as CoreError,
  history::{HistoryEntry, NewHistoryEntry},
  knowledge::{
    Disease, DiseaseUpdate, KnowledgeCounts, Rule, Solution, Symptom, validate_disease_code,
    validate_rule_codes,
  },
  session::{Answer, NewSession, Session, SessionStatus},
  store::{DiagnosisStore, HistoryQuery},
};

use crate::{
  Result,
  encode::{
    DISEASE_COLUMNS, HISTORY_COLUMNS, RULE_COLUMNS, RawAnswer, RawHistory, RawSession,
    SESSION_COLUMNS, SOLUTION_COLUMNS, disease_from_row, encode_biodata, encode_dt,
    encode_history_status, encode_session_status, encode_uuid, rule_from_row, solution_from_row,
    symptom_from_row,
  },
  error::Error,
  schema::SCHEMA,
};

/// Default page size for [`DiagnosisStore::list_history`].
const DEFAULT_HISTORY_LIMIT: usize = 100;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Somnia store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All access
/// is serialized on one connection thread, so each `call` is atomic with
/// respect to every other.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_session(&self, id: Uuid) -> Result<Option<RawSession>> {
    let id_str = encode_uuid(id);
    Ok(
      self
        .conn
        .call(move |conn| Ok(select_session(conn, &id_str)?))
        .await?,
    )
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run raw SQL on the connection thread.
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self.conn.call(move |conn| Ok(conn.execute_batch(sql)?)).await?;
    Ok(())
  }
}

fn select_session(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawSession>> {
  conn
    .query_row(
      &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
      rusqlite::params![id],
      RawSession::from_row,
    )
    .optional()
}

fn exists(conn: &rusqlite::Connection, sql: &str, key: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, rusqlite::params![key], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn disease_exists(conn: &rusqlite::Connection, code: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM diseases WHERE code = ?1", code)
}

fn symptom_exists(conn: &rusqlite::Connection, code: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM symptoms WHERE code = ?1", code)
}

fn count(conn: &rusqlite::Connection, table: &str) -> rusqlite::Result<usize> {
  let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
  Ok(n as usize)
}

/// Compare-and-swap the status fields of a session. Returns the number of
/// rows changed: 0 means the session is missing or `version` is stale.
fn swap_status(
  conn: &rusqlite::Connection,
  row: &StatusRow,
  at: &str,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE sessions
     SET status = ?2, current_disease_code = ?3, result_disease_code = ?4,
         version = version + 1, updated_at = ?5
     WHERE session_id = ?1 AND version = ?6",
    rusqlite::params![row.id, row.status, row.current, row.result, at, row.version],
  )
}

fn insert_history(conn: &rusqlite::Connection, row: &HistoryRow) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO history (
       session_id, biodata, status, disease_code, disease_name, message, recorded_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      row.session_id,
      row.biodata,
      row.status,
      row.disease_code,
      row.disease_name,
      row.message,
      row.recorded_at
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// The encoded status columns written by a session transition.
struct StatusRow {
  id:      String,
  status:  &'static str,
  current: Option<String>,
  result:  Option<String>,
  version: i64,
}

impl StatusRow {
  fn of(session: &Session) -> Self {
    Self {
      id:      encode_uuid(session.session_id),
      status:  encode_session_status(session.status),
      current: session.current_disease_code.clone(),
      result:  session.result_disease_code.clone(),
      version: session.version,
    }
  }
}

/// The encoded columns of a new history row.
struct HistoryRow {
  session_id:   String,
  biodata:      Option<String>,
  status:       &'static str,
  disease_code: Option<String>,
  disease_name: Option<String>,
  message:      String,
  recorded_at:  String,
}

impl HistoryRow {
  fn encode(entry: &NewHistoryEntry, recorded_at: DateTime<Utc>) -> Result<Self> {
    Ok(Self {
      session_id:   encode_uuid(entry.session_id),
      biodata:      encode_biodata(entry.biodata.as_ref())?,
      status:       encode_history_status(entry.status),
      disease_code: entry.disease_code.clone(),
      disease_name: entry.disease_name.clone(),
      message:      entry.message.clone(),
      recorded_at:  encode_dt(recorded_at),
    })
  }
}

fn history_entry(entry: NewHistoryEntry, history_id: i64, recorded_at: DateTime<Utc>) -> HistoryEntry {
  HistoryEntry {
    history_id,
    session_id: entry.session_id,
    biodata: entry.biodata,
    status: entry.status,
    disease_code: entry.disease_code,
    disease_name: entry.disease_name,
    message: entry.message,
    recorded_at,
  }
}

/// Convert a page bound for SQLite.
fn page_bound(value: usize, name: &'static str) -> Result<i64> {
  Ok(i64::try_from(value).map_err(|_| CoreError::OutOfRange(name))?)
}

// ─── DiagnosisStore impl ─────────────────────────────────────────────────────

impl DiagnosisStore for SqliteStore {
  type Error = Error;

  // ── Knowledge base: reads ─────────────────────────────────────────────────

  async fn list_diseases(&self) -> Result<Vec<Disease>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {DISEASE_COLUMNS} FROM diseases ORDER BY priority ASC, code ASC"
          ))?;
          let rows = stmt
            .query_map([], disease_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_disease(&self, code: &str) -> Result<Option<Disease>> {
    let code = code.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {DISEASE_COLUMNS} FROM diseases WHERE code = ?1"),
                rusqlite::params![code],
                disease_from_row,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn list_rules(&self, disease_code: &str) -> Result<Vec<Rule>> {
    let disease_code = disease_code.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM rules
             WHERE disease_code = ?1
             ORDER BY sort_order ASC, rule_id ASC"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![disease_code], rule_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn list_symptoms(&self) -> Result<Vec<Symptom>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT code, question FROM symptoms ORDER BY code ASC")?;
          let rows = stmt
            .query_map([], symptom_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_symptom(&self, code: &str) -> Result<Option<Symptom>> {
    let code = code.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT code, question FROM symptoms WHERE code = ?1",
                rusqlite::params![code],
                symptom_from_row,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn list_solutions(&self, disease_code: &str) -> Result<Vec<Solution>> {
    let disease_code = disease_code.to_owned();
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SOLUTION_COLUMNS} FROM solutions
             WHERE disease_code = ?1
             ORDER BY sort_order ASC, solution_id ASC"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![disease_code], solution_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn count_knowledge(&self) -> Result<KnowledgeCounts> {
    Ok(
      self
        .conn
        .call(|conn| {
          Ok(KnowledgeCounts {
            diseases:  count(conn, "diseases")?,
            symptoms:  count(conn, "symptoms")?,
            rules:     count(conn, "rules")?,
            solutions: count(conn, "solutions")?,
          })
        })
        .await?,
    )
  }

  // ── Knowledge base: administration ────────────────────────────────────────

  async fn create_disease(&self, disease: Disease) -> Result<Disease> {
    disease.validate()?;
    let row = disease.clone();

    self
      .conn
      .call(move |conn| {
        if disease_exists(conn, &row.code)? {
          return Ok(Err(CoreError::DuplicateDisease(row.code)));
        }
        conn.execute(
          "INSERT INTO diseases (code, name, description, priority) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![row.code, row.name, row.description, row.priority],
        )?;
        Ok(Ok(()))
      })
      .await??;

    debug!(disease = %disease.code, "created disease");
    Ok(disease)
  }

  async fn update_disease(&self, code: &str, update: DiseaseUpdate) -> Result<Disease> {
    validate_disease_code(code)?;
    update.validate()?;

    let disease = Disease {
      code:        code.to_owned(),
      name:        update.name,
      description: update.description,
      priority:    update.priority,
    };
    let row = disease.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE diseases SET name = ?2, description = ?3, priority = ?4 WHERE code = ?1",
          rusqlite::params![row.code, row.name, row.description, row.priority],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(CoreError::DiseaseNotFound(disease.code).into());
    }
    Ok(disease)
  }

  async fn delete_disease(&self, code: &str) -> Result<()> {
    let code_str = code.to_owned();
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM diseases WHERE code = ?1", rusqlite::params![code_str])?)
      })
      .await?;

    if deleted == 0 {
      return Err(CoreError::DiseaseNotFound(code.to_owned()).into());
    }
    debug!(disease = %code, "deleted disease");
    Ok(())
  }

  async fn create_symptom(&self, symptom: Symptom) -> Result<Symptom> {
    symptom.validate()?;
    let row = symptom.clone();

    self
      .conn
      .call(move |conn| {
        if symptom_exists(conn, &row.code)? {
          return Ok(Err(CoreError::DuplicateSymptom(row.code)));
        }
        conn.execute(
          "INSERT INTO symptoms (code, question) VALUES (?1, ?2)",
          rusqlite::params![row.code, row.question],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(symptom)
  }

  async fn update_symptom(&self, code: &str, question: String) -> Result<Symptom> {
    let symptom = Symptom { code: code.to_owned(), question };
    symptom.validate()?;
    let row = symptom.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE symptoms SET question = ?2 WHERE code = ?1",
          rusqlite::params![row.code, row.question],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(CoreError::SymptomNotFound(symptom.code).into());
    }
    Ok(symptom)
  }

  async fn delete_symptom(&self, code: &str) -> Result<()> {
    let code_str = code.to_owned();
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM symptoms WHERE code = ?1", rusqlite::params![code_str])?)
      })
      .await?;

    if deleted == 0 {
      return Err(CoreError::SymptomNotFound(code.to_owned()).into());
    }
    debug!(symptom = %code, "deleted symptom");
    Ok(())
  }

  async fn set_rules(&self, disease_code: &str, symptom_codes: Vec<String>) -> Result<Vec<Rule>> {
    validate_rule_codes(disease_code, &symptom_codes)?;
    let disease_code = disease_code.to_owned();

    let rules = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !disease_exists(&tx, &disease_code)? {
          return Ok(Err(CoreError::DiseaseNotFound(disease_code)));
        }
        for code in &symptom_codes {
          if !symptom_exists(&tx, code)? {
            return Ok(Err(CoreError::UnknownRuleSymptom {
              disease: disease_code,
              symptom: code.clone(),
            }));
          }
        }

        tx.execute("DELETE FROM rules WHERE disease_code = ?1", rusqlite::params![disease_code])?;
        {
          let mut insert = tx.prepare(
            "INSERT INTO rules (disease_code, symptom_code, sort_order) VALUES (?1, ?2, ?3)",
          )?;
          for (idx, code) in symptom_codes.iter().enumerate() {
            insert.execute(rusqlite::params![disease_code, code, idx as i64])?;
          }
        }

        let rules = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM rules
             WHERE disease_code = ?1
             ORDER BY sort_order ASC, rule_id ASC"
          ))?;
          stmt
            .query_map(rusqlite::params![disease_code], rule_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(Ok(rules))
      })
      .await??;

    Ok(rules)
  }

  async fn set_solutions(&self, disease_code: &str, lines: Vec<String>) -> Result<Vec<Solution>> {
    validate_disease_code(disease_code)?;
    if lines.iter().any(|l| l.trim().is_empty()) {
      return Err(CoreError::EmptyField("solution text").into());
    }
    let disease_code = disease_code.to_owned();

    let solutions = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !disease_exists(&tx, &disease_code)? {
          return Ok(Err(CoreError::DiseaseNotFound(disease_code)));
        }

        tx.execute(
          "DELETE FROM solutions WHERE disease_code = ?1",
          rusqlite::params![disease_code],
        )?;
        {
          let mut insert = tx.prepare(
            "INSERT INTO solutions (disease_code, sort_order, text) VALUES (?1, ?2, ?3)",
          )?;
          for (idx, line) in lines.iter().enumerate() {
            insert.execute(rusqlite::params![disease_code, idx as i64, line])?;
          }
        }

        let solutions = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {SOLUTION_COLUMNS} FROM solutions
             WHERE disease_code = ?1
             ORDER BY sort_order ASC, solution_id ASC"
          ))?;
          stmt
            .query_map(rusqlite::params![disease_code], solution_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(Ok(solutions))
      })
      .await??;

    Ok(solutions)
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, input: NewSession) -> Result<Session> {
    let now = Utc::now();
    let session = Session {
      session_id:           Uuid::new_v4(),
      status:               SessionStatus::Asking,
      mode:                 input.mode,
      biodata:              input.biodata,
      current_disease_code: input.current_disease_code,
      result_disease_code:  None,
      version:              0,
      created_at:           now,
      updated_at:           now,
    };

    let id_str      = encode_uuid(session.session_id);
    let status_str  = encode_session_status(session.status);
    let target      = session.mode.target().map(str::to_owned);
    let biodata_str = encode_biodata(session.biodata.as_ref())?;
    let current     = session.current_disease_code.clone();
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (
             session_id, status, target_disease_code, biodata,
             current_disease_code, result_disease_code, version, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, 0, ?6, ?6)",
          rusqlite::params![id_str, status_str, target, biodata_str, current, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    self
      .fetch_session(id)
      .await?
      .map(RawSession::into_session)
      .transpose()
  }

  async fn list_answers(&self, id: Uuid) -> Result<Vec<Answer>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawAnswer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT session_id, symptom_code, value, answered_at FROM answers
           WHERE session_id = ?1
           ORDER BY answered_at ASC, symptom_code ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAnswer {
              session_id:   row.get(0)?,
              symptom_code: row.get(1)?,
              value:        row.get(2)?,
              answered_at:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnswer::into_answer).collect()
  }

  async fn upsert_answer(&self, id: Uuid, symptom_code: &str, value: bool) -> Result<Session> {
    let id_str     = encode_uuid(id);
    let code       = symptom_code.to_owned();
    let at_str     = encode_dt(Utc::now());
    let asking_str = encode_session_status(SessionStatus::Asking);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(current) = select_session(&tx, &id_str)? else {
          return Ok(Err(CoreError::SessionNotFound(id)));
        };
        if current.status != asking_str {
          return Ok(Ok(current));
        }

        tx.execute(
          "INSERT INTO answers (session_id, symptom_code, value, answered_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (session_id, symptom_code)
           DO UPDATE SET value = excluded.value, answered_at = excluded.answered_at",
          rusqlite::params![id_str, code, value, at_str],
        )?;
        tx.execute(
          "UPDATE sessions SET version = version + 1, updated_at = ?2 WHERE session_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;

        let updated = select_session(&tx, &id_str)?;
        tx.commit()?;
        Ok(updated.ok_or(CoreError::SessionNotFound(id)))
      })
      .await??;

    raw.into_session()
  }

  async fn persist_session(&self, session: &Session) -> Result<Session> {
    let id     = session.session_id;
    let row    = StatusRow::of(session);
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = swap_status(&tx, &row, &at_str)?;
        let stored = select_session(&tx, &row.id)?;
        tx.commit()?;
        Ok(match (changed, stored) {
          (_, None) => Err(CoreError::SessionNotFound(id)),
          (0, Some(_)) => Err(CoreError::Conflict(id)),
          (_, Some(raw)) => Ok(raw),
        })
      })
      .await??;

    raw.into_session()
  }

  async fn conclude_session(
    &self,
    session: &Session,
    entry: NewHistoryEntry,
  ) -> Result<(Session, HistoryEntry)> {
    let id          = session.session_id;
    let row         = StatusRow::of(session);
    let recorded_at = Utc::now();
    let history     = HistoryRow::encode(&entry, recorded_at)?;

    let (raw, history_id) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = swap_status(&tx, &row, &history.recorded_at)?;
        let Some(stored) = select_session(&tx, &row.id)? else {
          return Ok(Err(CoreError::SessionNotFound(id)));
        };
        if changed == 0 {
          return Ok(Err(CoreError::Conflict(id)));
        }

        let history_id = insert_history(&tx, &history)?;
        tx.commit()?;
        Ok(Ok((stored, history_id)))
      })
      .await??;

    debug!(session_id = %id, history_id, "concluded session");
    Ok((raw.into_session()?, history_entry(entry, history_id, recorded_at)))
  }

  async fn delete_session(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM sessions WHERE session_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    if deleted == 0 {
      return Err(CoreError::SessionNotFound(id).into());
    }
    Ok(())
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn append_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
    let recorded_at = Utc::now();
    let row         = HistoryRow::encode(&entry, recorded_at)?;

    let history_id = self
      .conn
      .call(move |conn| Ok(insert_history(conn, &row)?))
      .await?;

    Ok(history_entry(entry, history_id, recorded_at))
  }

  async fn list_history(&self, query: &HistoryQuery) -> Result<Vec<HistoryEntry>> {
    let limit_val  = page_bound(query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT), "history limit")?;
    let offset_val = page_bound(query.offset.unwrap_or(0), "history offset")?;

    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS} FROM history
           ORDER BY history_id DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], RawHistory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_entry).collect()
  }

  async fn get_history(&self, id: i64) -> Result<Option<HistoryEntry>> {
    let raw: Option<RawHistory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {HISTORY_COLUMNS} FROM history WHERE history_id = ?1"),
              rusqlite::params![id],
              RawHistory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHistory::into_entry).transpose()
  }

  async fn find_history_by_session(&self, id: Uuid) -> Result<Option<HistoryEntry>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawHistory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {HISTORY_COLUMNS} FROM history
                 WHERE session_id = ?1
                 ORDER BY history_id DESC
                 LIMIT 1"
              ),
              rusqlite::params![id_str],
              RawHistory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHistory::into_entry).transpose()
  }
}
