//! The backward-chaining inference engine.
//!
//! [`evaluate`] is a pure function of a [`KnowledgeBase`] snapshot, a
//! [`SearchMode`], and the answers recorded so far. For each hypothesis in
//! search order it applies three rules to the required symptoms:
//!
//! 1. any answered `false` → the hypothesis is rejected (fail fast);
//! 2. all answered `true` → the hypothesis is proven;
//! 3. otherwise → ask the first unanswered symptom in rule order.
//!
//! A negative answer rejects every hypothesis that requires that symptom,
//! including ones not yet reached.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
  Error, Result,
  knowledge::{Disease, KnowledgeBase, Solution, Symptom},
  session::{AnswerMap, SearchMode, Session, SessionStatus},
};

/// Shown when free search exhausts every hypothesis.
pub const NO_MATCH_NOTE: &str =
  "No disease hypothesis could be proven. Recommendation: consult a doctor.";

/// Shown when the pre-selected disease is rejected.
pub const UNSATISFIED_NOTE: &str = "Based on your answers, the symptoms are not \
  sufficient to conclude the selected disease. This system only checks \
  diseases in its knowledge base. If your complaints disrupt your activities \
  or get worse, consult a health professional.";

// ─── Steps ───────────────────────────────────────────────────────────────────

/// A question to put to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub code:     String,
  pub question: String,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  /// Every required symptom of this disease was answered `true`.
  Proven(String),
  /// Free search rejected every hypothesis.
  NoMatch,
  /// The pre-selected disease was rejected.
  Unsatisfied(String),
}

impl Verdict {
  /// Recover the verdict of a terminal session; `None` while still asking.
  ///
  /// An unsatisfied session that names neither a current nor a target
  /// disease is [`Error::CorruptSession`].
  pub fn of_session(session: &Session) -> Result<Option<Self>> {
    Ok(match session.status {
      SessionStatus::Asking => None,
      SessionStatus::Done => Some(match &session.result_disease_code {
        Some(code) => Self::Proven(code.clone()),
        None => Self::NoMatch,
      }),
      SessionStatus::Unsatisfied => {
        let code = session
          .current_disease_code
          .as_deref()
          .or(session.mode.target())
          .ok_or(Error::CorruptSession(session.session_id))?;
        Some(Self::Unsatisfied(code.to_owned()))
      }
    })
  }

  /// Write the verdict into a session's status fields.
  pub fn apply(&self, session: &mut Session) {
    match self {
      Self::Proven(code) => {
        session.status = SessionStatus::Done;
        session.current_disease_code = Some(code.clone());
        session.result_disease_code = Some(code.clone());
      }
      Self::NoMatch => {
        session.status = SessionStatus::Done;
        session.current_disease_code = None;
        session.result_disease_code = None;
      }
      Self::Unsatisfied(code) => {
        session.status = SessionStatus::Unsatisfied;
        session.current_disease_code = Some(code.clone());
        session.result_disease_code = None;
      }
    }
  }

  /// The disease this verdict is about, if any.
  pub fn disease_code(&self) -> Option<&str> {
    match self {
      Self::Proven(code) | Self::Unsatisfied(code) => Some(code),
      Self::NoMatch => None,
    }
  }
}

/// The engine's decision for the current answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  Ask {
    /// The hypothesis the question belongs to.
    disease_code: String,
    question:     Question,
  },
  Conclude(Verdict),
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

enum Judgement<'a> {
  Rejected,
  Proven,
  Pending(&'a str),
}

fn judge<'a>(required: &'a [String], answers: &AnswerMap) -> Judgement<'a> {
  if required.iter().any(|c| answers.get(c) == Some(&false)) {
    return Judgement::Rejected;
  }
  match required.iter().find(|c| !answers.contains_key(c.as_str())) {
    Some(code) => Judgement::Pending(code),
    None => Judgement::Proven,
  }
}

/// Decide the next step.
///
/// Free search skips hypotheses without rules. In single-hypothesis mode an
/// unknown target is [`Error::DiseaseNotFound`] and a target without rules is
/// [`Error::EmptyRuleSet`].
pub fn evaluate(kb: &KnowledgeBase, mode: &SearchMode, answers: &AnswerMap) -> Result<Step> {
  match mode {
    SearchMode::FreeSearch => {
      for hypothesis in kb.hypotheses() {
        let code = &hypothesis.disease.code;
        if hypothesis.required.is_empty() {
          warn!(disease = %code, "skipping hypothesis without rules");
          continue;
        }
        match judge(&hypothesis.required, answers) {
          Judgement::Rejected => continue,
          Judgement::Proven => return Ok(Step::Conclude(Verdict::Proven(code.clone()))),
          Judgement::Pending(symptom) => return Ok(ask(kb, code, symptom)),
        }
      }
      Ok(Step::Conclude(Verdict::NoMatch))
    }

    SearchMode::SingleHypothesis { disease_code } => {
      let hypothesis = kb
        .hypothesis(disease_code)
        .ok_or_else(|| Error::DiseaseNotFound(disease_code.clone()))?;
      if hypothesis.required.is_empty() {
        return Err(Error::EmptyRuleSet(disease_code.clone()));
      }
      Ok(match judge(&hypothesis.required, answers) {
        Judgement::Rejected => Step::Conclude(Verdict::Unsatisfied(disease_code.clone())),
        Judgement::Proven => Step::Conclude(Verdict::Proven(disease_code.clone())),
        Judgement::Pending(symptom) => ask(kb, disease_code, symptom),
      })
    }
  }
}

fn ask(kb: &KnowledgeBase, disease_code: &str, symptom: &str) -> Step {
  Step::Ask {
    disease_code: disease_code.to_owned(),
    question:     Question {
      code:     symptom.to_owned(),
      question: kb.symptom_text(symptom).to_owned(),
    },
  }
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// How far through a hypothesis' required symptoms the user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
  pub asked: usize,
  /// Never zero.
  pub total: usize,
}

impl Progress {
  pub fn of(required: &[String], answers: &AnswerMap) -> Self {
    Self {
      asked: required.iter().filter(|c| answers.contains_key(c.as_str())).count(),
      total: required.len().max(1),
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// A disease together with its ordered required symptom codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseDetail {
  #[serde(flatten)]
  pub disease:  Disease,
  pub symptoms: Vec<String>,
}

/// What the user sees once a session is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
  /// The concluded or rejected disease; `None` only for a no-match.
  pub disease_code:     Option<String>,
  pub disease_name:     Option<String>,
  /// The full record, while the disease is still in the knowledge base.
  pub disease:          Option<DiseaseDetail>,
  /// Required symptoms answered `true`, sorted by code.
  pub matched_symptoms: Vec<Symptom>,
  /// `Some(100)` when every required symptom is `true`; never partial.
  pub confidence:       Option<u8>,
  pub solutions:        Vec<Solution>,
  pub note:             Option<String>,
}

/// Assemble the result for `verdict`. `solutions` belong to the verdict's
/// disease and are passed through untouched.
///
/// If the verdict's disease has since been deleted the code is kept and
/// `disease_name` is left for the caller to fill from the history log.
pub fn build_result(
  kb: &KnowledgeBase,
  verdict: &Verdict,
  answers: &AnswerMap,
  solutions: Vec<Solution>,
) -> DiagnosisResult {
  let note = match verdict {
    Verdict::Proven(_) => None,
    Verdict::NoMatch => Some(NO_MATCH_NOTE.to_owned()),
    Verdict::Unsatisfied(_) => Some(UNSATISFIED_NOTE.to_owned()),
  };
  let disease_code = verdict.disease_code().map(str::to_owned);

  let Some(hypothesis) = verdict.disease_code().and_then(|code| kb.hypothesis(code)) else {
    return DiagnosisResult {
      disease_code,
      disease_name: None,
      disease: None,
      matched_symptoms: Vec::new(),
      confidence: matches!(verdict, Verdict::Proven(_)).then_some(100),
      solutions,
      note,
    };
  };

  let required = &hypothesis.required;
  let mut matched: Vec<&String> = required
    .iter()
    .filter(|c| answers.get(c.as_str()) == Some(&true))
    .collect();
  matched.sort();

  let matched_symptoms = matched
    .into_iter()
    .map(|code| Symptom {
      code:     code.clone(),
      question: kb.symptom_text(code).to_owned(),
    })
    .collect::<Vec<_>>();

  let all_true = !required.is_empty() && matched_symptoms.len() == required.len();

  DiagnosisResult {
    disease_code,
    disease_name: Some(hypothesis.disease.name.clone()),
    disease: Some(DiseaseDetail {
      disease:  hypothesis.disease.clone(),
      symptoms: required.clone(),
    }),
    matched_symptoms,
    confidence: all_true.then_some(100),
    solutions,
    note,
  }
}
