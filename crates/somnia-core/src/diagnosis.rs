//! [`Diagnoser`] drives sessions through the engine against a store.
//!
//! Recording an answer and advancing a session are separate calls: a client
//! may submit answers and poll independently, and a session can be
//! re-evaluated after a rule edit without re-answering anything.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  engine::{self, DiagnosisResult, NO_MATCH_NOTE, Progress, Question, Step, UNSATISFIED_NOTE, Verdict},
  history::{self, HistoryStatus},
  knowledge::{KnowledgeBase, validate_disease_code, validate_symptom_code},
  session::{AnswerMap, Biodata, NewSession, SearchMode, Session, SessionStatus, answer_map},
  store::{DiagnosisStore, ResultExt as _},
};

/// Input for [`Diagnoser::start`]. Naming a disease selects
/// [`SearchMode::SingleHypothesis`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
  pub biodata:      Option<Biodata>,
  pub disease_code: Option<String>,
}

/// The state of a session after a start or step.
///
/// Exactly one of `question` and `result` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
  pub session:  Session,
  pub question: Option<Question>,
  pub result:   Option<DiagnosisResult>,
  pub progress: Progress,
}

/// The flattened shape of a [`StepOutcome`] sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepView {
  pub session_id:   Uuid,
  pub status:       SessionStatus,
  pub mode:         SearchMode,
  /// The hypothesis under test, or the one concluded / rejected.
  pub disease_code: Option<String>,
  pub question:     Option<Question>,
  pub result:       Option<DiagnosisResult>,
  pub progress:     Progress,
}

impl From<StepOutcome> for StepView {
  fn from(outcome: StepOutcome) -> Self {
    Self {
      session_id:   outcome.session.session_id,
      status:       outcome.session.status,
      mode:         outcome.session.mode,
      disease_code: outcome.session.current_disease_code,
      question:     outcome.question,
      result:       outcome.result,
      progress:     outcome.progress,
    }
  }
}

/// The diagnosis service.
///
/// Cloning is cheap; the store is reference-counted.
pub struct Diagnoser<S> {
  store: Arc<S>,
}

impl<S> Clone for Diagnoser<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: DiagnosisStore> Diagnoser<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Open a session and return its first question.
  ///
  /// Nothing is written when the knowledge base has no question to ask; the
  /// call fails with [`Error::NoQuestion`] (or [`Error::EmptyRuleSet`] for a
  /// pre-selected disease without rules).
  pub async fn start(&self, request: StartRequest) -> Result<StepOutcome> {
    if let Some(biodata) = &request.biodata {
      biodata.validate()?;
    }
    let mode = match request.disease_code {
      Some(code) => {
        validate_disease_code(&code)?;
        SearchMode::SingleHypothesis { disease_code: code }
      }
      None => SearchMode::FreeSearch,
    };

    let kb = KnowledgeBase::load(self.store()).await?;
    let answers = AnswerMap::new();
    let Step::Ask { disease_code, question } = engine::evaluate(&kb, &mode, &answers)? else {
      return Err(Error::NoQuestion);
    };

    let session = self
      .store
      .create_session(NewSession {
        mode,
        biodata: request.biodata,
        current_disease_code: Some(disease_code.clone()),
      })
      .await
      .into_core()?;

    info!(
      session_id = %session.session_id,
      mode = ?session.mode,
      first = %question.code,
      "started diagnosis session"
    );

    Ok(StepOutcome {
      progress: Progress::of(kb.required_symptoms(&disease_code), &answers),
      session,
      question: Some(question),
      result: None,
    })
  }

  /// Record (or overwrite) one answer. Never advances the session.
  ///
  /// Answers to a finished session are ignored and the session is returned
  /// unchanged.
  pub async fn answer(&self, id: Uuid, symptom_code: &str, value: bool) -> Result<Session> {
    validate_symptom_code(symptom_code)?;

    let session = self.load_session(id).await?;
    if session.status.is_terminal() {
      debug!(session_id = %id, symptom = symptom_code, "ignoring answer to finished session");
      return Ok(session);
    }

    if self.store.get_symptom(symptom_code).await.into_core()?.is_none() {
      return Err(Error::SymptomNotFound(symptom_code.to_owned()));
    }

    let session = self
      .store
      .upsert_answer(id, symptom_code, value)
      .await
      .into_core()?;
    debug!(session_id = %id, symptom = symptom_code, value, "recorded answer");
    Ok(session)
  }

  /// Evaluate the session against its answers and persist the transition.
  ///
  /// A finished session is not re-evaluated; its stored verdict is rebuilt
  /// into the same result every time.
  pub async fn step(&self, id: Uuid) -> Result<StepOutcome> {
    let session = self.load_session(id).await?;
    let kb = KnowledgeBase::load(self.store()).await?;
    let answers = answer_map(&self.store.list_answers(id).await.into_core()?);

    if let Some(verdict) = Verdict::of_session(&session)? {
      return self.outcome(&kb, session, &verdict, &answers).await;
    }

    match engine::evaluate(&kb, &session.mode, &answers)? {
      Step::Ask { disease_code, question } => {
        let mut session = session;
        if session.current_disease_code.as_deref() != Some(disease_code.as_str()) {
          session.current_disease_code = Some(disease_code.clone());
          session = self.persist(&session).await?;
        }
        debug!(session_id = %id, disease = %disease_code, symptom = %question.code, "next question");
        Ok(StepOutcome {
          progress: Progress::of(kb.required_symptoms(&disease_code), &answers),
          session,
          question: Some(question),
          result: None,
        })
      }
      Step::Conclude(verdict) => self.conclude(&kb, session, verdict, &answers).await,
    }
  }

  /// [`answer`](Self::answer) followed by [`step`](Self::step).
  pub async fn answer_and_step(
    &self,
    id: Uuid,
    symptom_code: &str,
    value: bool,
  ) -> Result<StepOutcome> {
    self.answer(id, symptom_code, value).await?;
    self.step(id).await
  }

  /// Purge a session and its answers; its history entry survives.
  pub async fn delete_session(&self, id: Uuid) -> Result<()> {
    self.store.delete_session(id).await.into_core()?;
    info!(session_id = %id, "purged diagnosis session");
    Ok(())
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  async fn load_session(&self, id: Uuid) -> Result<Session> {
    self
      .store
      .get_session(id)
      .await
      .into_core()?
      .ok_or(Error::SessionNotFound(id))
  }

  async fn persist(&self, session: &Session) -> Result<Session> {
    self
      .store
      .persist_session(session)
      .await
      .into_core()
      .inspect_err(|e| warn_if_conflict(e, session.version))
  }

  async fn conclude(
    &self,
    kb: &KnowledgeBase,
    mut session: Session,
    verdict: Verdict,
    answers: &AnswerMap,
  ) -> Result<StepOutcome> {
    verdict.apply(&mut session);

    let disease = verdict
      .disease_code()
      .and_then(|code| kb.hypothesis(code))
      .map(|h| &h.disease);

    let (status, message) = match &verdict {
      Verdict::Proven(code) => {
        let name = disease.map_or(code.as_str(), |d| d.name.as_str());
        (HistoryStatus::Completed, format!("Your answers match the rules for {name}."))
      }
      Verdict::NoMatch => (HistoryStatus::NoMatch, NO_MATCH_NOTE.to_owned()),
      Verdict::Unsatisfied(_) => (HistoryStatus::Unsatisfied, UNSATISFIED_NOTE.to_owned()),
    };
    let (session, _) = history::record(self.store(), &session, status, disease, message)
      .await
      .inspect_err(|e| warn_if_conflict(e, session.version))?;

    info!(
      session_id = %session.session_id,
      status = %session.status,
      disease = ?verdict.disease_code(),
      "diagnosis concluded"
    );
    self.outcome(kb, session, &verdict, answers).await
  }

  async fn outcome(
    &self,
    kb: &KnowledgeBase,
    session: Session,
    verdict: &Verdict,
    answers: &AnswerMap,
  ) -> Result<StepOutcome> {
    let (solutions, required) = match verdict.disease_code() {
      Some(code) => (
        self.store.list_solutions(code).await.into_core()?,
        kb.required_symptoms(code),
      ),
      None => (Vec::new(), &[][..]),
    };

    let mut result = engine::build_result(kb, verdict, answers, solutions);
    if result.disease_name.is_none() && result.disease_code.is_some() {
      result.disease_name = self
        .store
        .find_history_by_session(session.session_id)
        .await
        .into_core()?
        .and_then(|entry| entry.disease_name);
    }

    Ok(StepOutcome {
      progress: Progress::of(required, answers),
      result: Some(result),
      question: None,
      session,
    })
  }
}

fn warn_if_conflict(err: &Error, version: i64) {
  if let Error::Conflict(id) = err {
    warn!(session_id = %id, version, "lost a concurrent update");
  }
}
