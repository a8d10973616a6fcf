//! Knowledge-base records and the ordered snapshot the engine reasons over.
//!
//! Storage backends may return rows in any order. [`KnowledgeBase`] re-sorts
//! everything with the comparators defined here, so the search order never
//! depends on the backend.

use std::{
  cmp::Ordering,
  collections::{HashMap, HashSet},
};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  store::{DiagnosisStore, ResultExt as _},
};

// ─── Codes ───────────────────────────────────────────────────────────────────

/// Check that `code` looks like `P01`.
pub fn validate_disease_code(code: &str) -> Result<()> {
  validate_code(code, 'P', "disease", "'P' followed by two digits")
}

/// Check that `code` looks like `G01`.
pub fn validate_symptom_code(code: &str) -> Result<()> {
  validate_code(code, 'G', "symptom", "'G' followed by two digits")
}

fn validate_code(
  code: &str,
  prefix: char,
  kind: &'static str,
  expected: &'static str,
) -> Result<()> {
  let mut chars = code.chars();
  let well_formed = code.len() == 3
    && chars.next() == Some(prefix)
    && chars.all(|c| c.is_ascii_digit());

  if well_formed {
    Ok(())
  } else {
    Err(Error::InvalidCode { kind, code: code.to_owned(), expected })
  }
}

fn require(value: &str, field: &'static str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::EmptyField(field));
  }
  Ok(())
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A disease hypothesis. Lower `priority` is tested first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
  pub code:        String,
  pub name:        String,
  #[serde(default)]
  pub description: String,
  #[serde(default = "default_priority")]
  pub priority:    i64,
}

fn default_priority() -> i64 { 100 }

impl Disease {
  /// Backward-chaining search order: `(priority asc, code asc)`.
  pub fn hypothesis_order(a: &Self, b: &Self) -> Ordering {
    a.priority
      .cmp(&b.priority)
      .then_with(|| a.code.cmp(&b.code))
  }

  pub fn validate(&self) -> Result<()> {
    validate_disease_code(&self.code)?;
    require(&self.name, "disease name")
  }
}

/// Mutable fields of a [`Disease`]; the code is immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseUpdate {
  pub name:        String,
  #[serde(default)]
  pub description: String,
  #[serde(default = "default_priority")]
  pub priority:    i64,
}

impl DiseaseUpdate {
  pub fn validate(&self) -> Result<()> { require(&self.name, "disease name") }
}

/// A yes/no diagnostic question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
  pub code:     String,
  pub question: String,
}

impl Symptom {
  pub fn validate(&self) -> Result<()> {
    validate_symptom_code(&self.code)?;
    require(&self.question, "symptom question")
  }
}

/// One required symptom of a disease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  /// Insertion id; breaks ties between equal `sort_order` values.
  pub rule_id:      i64,
  pub disease_code: String,
  pub symptom_code: String,
  pub sort_order:   i64,
}

impl Rule {
  /// Question order within a disease: `(sort_order asc, rule_id asc)`.
  pub fn evaluation_order(a: &Self, b: &Self) -> Ordering {
    a.sort_order
      .cmp(&b.sort_order)
      .then_with(|| a.rule_id.cmp(&b.rule_id))
  }
}

/// Validate a replacement rule set before it touches storage.
///
/// Only formats and duplicates are checked here; the store checks that every
/// code refers to an existing symptom inside the same transaction as the
/// write.
pub fn validate_rule_codes(disease_code: &str, symptom_codes: &[String]) -> Result<()> {
  validate_disease_code(disease_code)?;
  let mut seen = HashSet::new();
  for code in symptom_codes {
    validate_symptom_code(code)?;
    if !seen.insert(code.as_str()) {
      return Err(Error::DuplicateRuleSymptom {
        disease: disease_code.to_owned(),
        symptom: code.clone(),
      });
    }
  }
  Ok(())
}

/// A recommendation line shown alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
  pub solution_id:  i64,
  pub disease_code: String,
  pub sort_order:   i64,
  pub text:         String,
}

/// Row counts used to decide which tables need seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeCounts {
  pub diseases:  usize,
  pub symptoms:  usize,
  pub rules:     usize,
  pub solutions: usize,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A disease together with its required symptom codes in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis {
  pub disease:  Disease,
  pub required: Vec<String>,
}

/// An in-memory, fully ordered view of the knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
  hypotheses: Vec<Hypothesis>,
  symptoms:   HashMap<String, Symptom>,
}

impl KnowledgeBase {
  /// Build a snapshot from unordered parts. Rules naming an unknown disease
  /// are dropped.
  pub fn new(
    mut diseases: Vec<Disease>,
    mut rules: Vec<Rule>,
    symptoms: Vec<Symptom>,
  ) -> Self {
    diseases.sort_by(Disease::hypothesis_order);
    rules.sort_by(Rule::evaluation_order);

    let mut required: HashMap<String, Vec<String>> = HashMap::new();
    for rule in rules {
      required.entry(rule.disease_code).or_default().push(rule.symptom_code);
    }

    let hypotheses = diseases
      .into_iter()
      .map(|disease| Hypothesis {
        required: required.remove(&disease.code).unwrap_or_default(),
        disease,
      })
      .collect();

    let symptoms = symptoms
      .into_iter()
      .map(|s| (s.code.clone(), s))
      .collect();

    Self { hypotheses, symptoms }
  }

  /// Read the whole knowledge base from `store`.
  pub async fn load<S: DiagnosisStore>(store: &S) -> Result<Self> {
    let diseases = store.list_diseases().await.into_core()?;

    let mut rules = Vec::new();
    for disease in &diseases {
      rules.extend(store.list_rules(&disease.code).await.into_core()?);
    }

    let symptoms = store.list_symptoms().await.into_core()?;
    Ok(Self::new(diseases, rules, symptoms))
  }

  /// All hypotheses in search order.
  pub fn hypotheses(&self) -> &[Hypothesis] { &self.hypotheses }

  pub fn hypothesis(&self, disease_code: &str) -> Option<&Hypothesis> {
    self
      .hypotheses
      .iter()
      .find(|h| h.disease.code == disease_code)
  }

  /// Required symptom codes for a disease; empty for an unknown disease.
  pub fn required_symptoms(&self, disease_code: &str) -> &[String] {
    self
      .hypothesis(disease_code)
      .map(|h| h.required.as_slice())
      .unwrap_or_default()
  }

  pub fn symptom(&self, code: &str) -> Option<&Symptom> { self.symptoms.get(code) }

  /// Question text for a symptom, or the raw code when it is unknown.
  pub fn symptom_text<'a>(&'a self, code: &'a str) -> &'a str {
    self
      .symptoms
      .get(code)
      .map(|s| s.question.as_str())
      .unwrap_or(code)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn disease(code: &str, priority: i64) -> Disease {
    Disease {
      code: code.into(),
      name: format!("Disease {code}"),
      description: String::new(),
      priority,
    }
  }

  fn rule(rule_id: i64, disease: &str, symptom: &str, sort_order: i64) -> Rule {
    Rule {
      rule_id,
      disease_code: disease.into(),
      symptom_code: symptom.into(),
      sort_order,
    }
  }

  #[test]
  fn codes_must_match_pattern() {
    assert!(validate_disease_code("P01").is_ok());
    assert!(validate_symptom_code("G25").is_ok());

    for bad in ["", "P1", "P001", "G01", "p01", "PA1"] {
      assert!(validate_disease_code(bad).is_err(), "{bad:?} accepted");
    }
    assert!(matches!(
      validate_symptom_code("P01"),
      Err(Error::InvalidCode { kind: "symptom", .. })
    ));
  }

  #[test]
  fn blank_names_are_rejected() {
    let mut d = disease("P01", 1);
    d.name = "   ".into();
    assert!(matches!(d.validate(), Err(Error::EmptyField(_))));

    let s = Symptom { code: "G01".into(), question: String::new() };
    assert!(matches!(s.validate(), Err(Error::EmptyField(_))));
  }

  #[test]
  fn duplicate_rule_codes_are_rejected() {
    let codes = vec!["G01".to_string(), "G02".into(), "G01".into()];
    assert!(matches!(
      validate_rule_codes("P01", &codes),
      Err(Error::DuplicateRuleSymptom { .. })
    ));
  }

  #[test]
  fn hypotheses_sorted_by_priority_then_code() {
    let kb = KnowledgeBase::new(
      vec![disease("P03", 10), disease("P01", 20), disease("P02", 10)],
      vec![],
      vec![],
    );
    let order: Vec<_> = kb.hypotheses().iter().map(|h| h.disease.code.as_str()).collect();
    assert_eq!(order, ["P02", "P03", "P01"]);
  }

  #[test]
  fn required_symptoms_sorted_by_order_then_insertion() {
    let kb = KnowledgeBase::new(
      vec![disease("P01", 1)],
      vec![
        rule(4, "P01", "G04", 1),
        rule(2, "P01", "G02", 0),
        rule(3, "P01", "G03", 1),
        rule(1, "P01", "G01", 2),
      ],
      vec![],
    );
    assert_eq!(kb.required_symptoms("P01"), ["G02", "G03", "G04", "G01"]);
    assert!(kb.required_symptoms("P99").is_empty());
  }

  #[test]
  fn symptom_text_falls_back_to_code() {
    let kb = KnowledgeBase::new(
      vec![],
      vec![],
      vec![Symptom { code: "G01".into(), question: "Trouble sleeping?".into() }],
    );
    assert_eq!(kb.symptom_text("G01"), "Trouble sleeping?");
    assert_eq!(kb.symptom_text("G77"), "G77");
  }
}
