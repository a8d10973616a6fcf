//! The `DiagnosisStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `somnia-store-sqlite`).
//! The engine, the diagnosis service, and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error, Result,
  history::{HistoryEntry, NewHistoryEntry},
  knowledge::{Disease, DiseaseUpdate, KnowledgeCounts, Rule, Solution, Symptom},
  session::{Answer, NewSession, Session},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`DiagnosisStore::list_history`].
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Somnia storage backend.
///
/// Every write commits before its future resolves. Domain failures detected
/// by the backend (a missing session, a stale version, an unknown symptom in
/// a rule edit, an out-of-range page) must convert into the matching
/// [`Error`] variant so callers can classify them.
pub trait DiagnosisStore: Send + Sync {
  type Error: std::error::Error + Into<Error> + Send + Sync + 'static;

  // ── Knowledge base: reads ─────────────────────────────────────────────

  /// All diseases, ideally in `(priority, code)` order.
  fn list_diseases(&self) -> impl Future<Output = Result<Vec<Disease>, Self::Error>> + Send + '_;

  fn get_disease<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Disease>, Self::Error>> + Send + 'a;

  /// Rules of one disease, ideally in `(sort_order, rule_id)` order.
  fn list_rules<'a>(
    &'a self,
    disease_code: &'a str,
  ) -> impl Future<Output = Result<Vec<Rule>, Self::Error>> + Send + 'a;

  /// All symptoms, ordered by code.
  fn list_symptoms(&self) -> impl Future<Output = Result<Vec<Symptom>, Self::Error>> + Send + '_;

  fn get_symptom<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Symptom>, Self::Error>> + Send + 'a;

  /// Solutions of one disease in display order.
  fn list_solutions<'a>(
    &'a self,
    disease_code: &'a str,
  ) -> impl Future<Output = Result<Vec<Solution>, Self::Error>> + Send + 'a;

  fn count_knowledge(&self) -> impl Future<Output = Result<KnowledgeCounts, Self::Error>> + Send + '_;

  // ── Knowledge base: administration ────────────────────────────────────

  /// Insert a disease. Fails with [`Error::DuplicateDisease`] if the code is
  /// taken.
  fn create_disease(
    &self,
    disease: Disease,
  ) -> impl Future<Output = Result<Disease, Self::Error>> + Send + '_;

  fn update_disease<'a>(
    &'a self,
    code: &'a str,
    update: DiseaseUpdate,
  ) -> impl Future<Output = Result<Disease, Self::Error>> + Send + 'a;

  /// Delete a disease together with its rules and solutions.
  fn delete_disease<'a>(&'a self, code: &'a str) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn create_symptom(
    &self,
    symptom: Symptom,
  ) -> impl Future<Output = Result<Symptom, Self::Error>> + Send + '_;

  fn update_symptom<'a>(
    &'a self,
    code: &'a str,
    question: String,
  ) -> impl Future<Output = Result<Symptom, Self::Error>> + Send + 'a;

  /// Delete a symptom together with every rule that requires it.
  fn delete_symptom<'a>(&'a self, code: &'a str) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Replace a disease's rule set; `sort_order` is the index in
  /// `symptom_codes`. Nothing is written unless every code names an
  /// existing symptom.
  fn set_rules<'a>(
    &'a self,
    disease_code: &'a str,
    symptom_codes: Vec<String>,
  ) -> impl Future<Output = Result<Vec<Rule>, Self::Error>> + Send + 'a;

  /// Replace a disease's solutions; `sort_order` is the index in `lines`.
  fn set_solutions<'a>(
    &'a self,
    disease_code: &'a str,
    lines: Vec<String>,
  ) -> impl Future<Output = Result<Vec<Solution>, Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn list_answers(&self, id: Uuid) -> impl Future<Output = Result<Vec<Answer>, Self::Error>> + Send + '_;

  /// Insert or overwrite the answer for `(id, symptom_code)` and bump the
  /// session version, atomically.
  ///
  /// A terminal session is returned unchanged without writing.
  /// Fails with [`Error::SessionNotFound`] if the session does not exist.
  fn upsert_answer<'a>(
    &'a self,
    id: Uuid,
    symptom_code: &'a str,
    value: bool,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'a;

  /// Write the status fields of `session` if, and only if, the stored
  /// version still equals `session.version`. Returns the stored session
  /// with its bumped version.
  ///
  /// Fails with [`Error::Conflict`] on a version mismatch.
  fn persist_session<'a>(
    &'a self,
    session: &'a Session,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'a;

  /// Commit the terminal transition of `session` and append `entry` to the
  /// history log as one atomic write. Returns the stored session with its
  /// bumped version and the appended entry.
  ///
  /// The session write is the same compare-and-swap as
  /// [`persist_session`](Self::persist_session): on a version mismatch it
  /// fails with [`Error::Conflict`] and no history is written. If the
  /// history insert fails the session is left untouched.
  fn conclude_session<'a>(
    &'a self,
    session: &'a Session,
    entry: NewHistoryEntry,
  ) -> impl Future<Output = Result<(Session, HistoryEntry), Self::Error>> + Send + 'a;

  /// Purge a session and its answers. History is untouched.
  fn delete_session(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// Append an entry on its own. Session transitions go through
  /// [`conclude_session`](Self::conclude_session) instead.
  fn append_history(
    &self,
    entry: NewHistoryEntry,
  ) -> impl Future<Output = Result<HistoryEntry, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_history<'a>(
    &'a self,
    query: &'a HistoryQuery,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + 'a;

  fn get_history(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<HistoryEntry>, Self::Error>> + Send + '_;

  /// The entry recorded when session `id` concluded, if any.
  fn find_history_by_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<HistoryEntry>, Self::Error>> + Send + '_;
}

/// Converts a backend result into a core [`Result`].
pub trait ResultExt<T> {
  fn into_core(self) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
  fn into_core(self) -> Result<T> { self.map_err(Into::into) }
}
