//! The bundled default knowledge base and first-boot seeding.
//!
//! Each table is seeded independently and only when it is empty, so a table
//! an administrator has already filled is never touched.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
  Result,
  knowledge::{Disease, Symptom},
  store::{DiagnosisStore, ResultExt as _},
};

const DISEASES: &[(&str, &str, &str, i64)] = &[
  (
    "P01",
    "Insomnia",
    "Difficulty falling asleep, staying asleep, or waking up too early.",
    10,
  ),
  (
    "P02",
    "Sleep Apnea",
    "The airway is partly or fully blocked during sleep, interrupting breathing.",
    20,
  ),
  (
    "P03",
    "Narcolepsy",
    "Excessive daytime sleepiness and sudden sleep attacks.",
    30,
  ),
  (
    "P04",
    "Restless Leg Syndrome",
    "Uncomfortable sensations in the legs at bedtime that make it hard to sleep.",
    40,
  ),
  (
    "P05",
    "Stress-Related Sleep Disorder",
    "Difficulty sleeping caused by psychological pressure, typically academic stress.",
    50,
  ),
];

const SYMPTOMS: &[(&str, &str)] = &[
  ("G01", "Do you have trouble falling asleep or often wake up during the night?"),
  ("G02", "Do you feel tired or low on energy during the day?"),
  ("G03", "Do you find it hard to sleep at night even when very tired?"),
  ("G04", "Do you wake up with a racing heart or a feeling of anxiety?"),
  ("G05", "Do you feel unrefreshed even after sleeping long enough?"),
  ("G06", "Do you snore loudly or feel short of breath while sleeping?"),
  ("G07", "Do you feel out of breath when you wake up?"),
  ("G08", "Do you wake up choking or gasping for air?"),
  ("G09", "Do you snore loudly with long pauses in breathing?"),
  ("G10", "Do you feel excessively sleepy during the day despite enough sleep?"),
  ("G11", "Do you suddenly fall asleep during the day without noticing?"),
  ("G12", "Do you struggle to stay awake during activities?"),
  ("G13", "Is your vision disturbed when you feel sleepy?"),
  ("G14", "Have you experienced sleep paralysis when waking up or falling asleep?"),
  ("G15", "Do you feel overwhelmingly sleepy during the day even after a full night?"),
  ("G16", "Do you feel uncomfortable sensations in your legs while sleeping?"),
  ("G17", "Do you feel tingling or an urge to move your legs while sleeping?"),
  ("G18", "Do your legs often feel sore or heavy at night?"),
  ("G19", "Do you often stretch your legs unconsciously while sleeping?"),
  ("G20", "Is your sleep disturbed because your legs keep moving?"),
  ("G21", "Do you find it hard to concentrate or focus during the day?"),
  ("G22", "Do you experience extreme mood swings during the day?"),
  ("G23", "Do you often feel angry or easily irritated during the day?"),
  ("G24", "Do you wake up suddenly feeling anxious?"),
  ("G25", "Do you find it hard to sleep even when the environment is comfortable?"),
];

const RULES: &[(&str, &[&str])] = &[
  ("P01", &["G01", "G02", "G03", "G04", "G05"]),
  ("P02", &["G01", "G06", "G07", "G08", "G09", "G10"]),
  ("P03", &["G01", "G11", "G12", "G13", "G14", "G15"]),
  ("P04", &["G16", "G17", "G18", "G19", "G20"]),
  ("P05", &["G21", "G22", "G23", "G24", "G25"]),
];

const SOLUTIONS: &[(&str, &[&str])] = &[
  ("P01", &[
    "Keep a consistent sleep and wake schedule, including weekends.",
    "Avoid caffeine, nicotine, and heavy meals in the evening.",
    "Limit screen use for an hour before bed.",
  ]),
  ("P02", &[
    "Sleep on your side rather than your back.",
    "Avoid alcohol and sedatives before bedtime.",
    "Ask a doctor about a sleep study and airway therapy.",
  ]),
  ("P03", &[
    "Schedule short naps during the day.",
    "Avoid driving or operating machinery when drowsy.",
    "See a sleep specialist for diagnosis and treatment.",
  ]),
  ("P04", &[
    "Stretch or massage your legs before bed.",
    "Exercise moderately during the day.",
    "Have your iron levels checked by a doctor.",
  ]),
  ("P05", &[
    "Practise relaxation techniques such as deep breathing before sleep.",
    "Break large tasks into smaller steps to reduce pressure.",
    "Talk to a counsellor if the stress persists.",
  ]),
];

/// A complete knowledge base to seed from.
#[derive(Debug, Clone)]
pub struct SeedData {
  pub diseases:  Vec<Disease>,
  pub symptoms:  Vec<Symptom>,
  /// Disease code → required symptom codes in order.
  pub rules:     Vec<(String, Vec<String>)>,
  /// Disease code → solution lines in order.
  pub solutions: Vec<(String, Vec<String>)>,
}

impl Default for SeedData {
  /// The bundled sleep-disorder knowledge base.
  fn default() -> Self {
    fn owned(table: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
      table
        .iter()
        .map(|(code, items)| {
          ((*code).to_owned(), items.iter().map(|s| (*s).to_owned()).collect())
        })
        .collect()
    }

    Self {
      diseases:  DISEASES
        .iter()
        .map(|(code, name, description, priority)| Disease {
          code:        (*code).to_owned(),
          name:        (*name).to_owned(),
          description: (*description).to_owned(),
          priority:    *priority,
        })
        .collect(),
      symptoms:  SYMPTOMS
        .iter()
        .map(|(code, question)| Symptom {
          code:     (*code).to_owned(),
          question: (*question).to_owned(),
        })
        .collect(),
      rules:     owned(RULES),
      solutions: owned(SOLUTIONS),
    }
  }
}

/// Number of rows written per table by [`seed_if_empty`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
  pub diseases:  usize,
  pub symptoms:  usize,
  pub rules:     usize,
  pub solutions: usize,
}

impl SeedReport {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// Fill every empty table from `seed`.
///
/// Rule and solution sets whose disease does not exist are skipped, and rule
/// codes naming a missing symptom are dropped, so seeding next to manually
/// entered data never fails on referential integrity.
pub async fn seed_if_empty<S: DiagnosisStore>(store: &S, seed: &SeedData) -> Result<SeedReport> {
  let counts = store.count_knowledge().await.into_core()?;
  let mut report = SeedReport::default();

  if counts.diseases == 0 {
    for disease in &seed.diseases {
      store.create_disease(disease.clone()).await.into_core()?;
      report.diseases += 1;
    }
  }

  if counts.symptoms == 0 {
    for symptom in &seed.symptoms {
      store.create_symptom(symptom.clone()).await.into_core()?;
      report.symptoms += 1;
    }
  }

  if counts.rules == 0 {
    let known: HashSet<String> = store
      .list_symptoms()
      .await
      .into_core()?
      .into_iter()
      .map(|s| s.code)
      .collect();

    for (disease_code, codes) in &seed.rules {
      if store.get_disease(disease_code).await.into_core()?.is_none() {
        warn!(disease = %disease_code, "skipping rule seed for missing disease");
        continue;
      }
      let codes: Vec<String> = codes
        .iter()
        .filter(|code| {
          let present = known.contains(code.as_str());
          if !present {
            warn!(disease = %disease_code, symptom = %code, "dropping rule for missing symptom");
          }
          present
        })
        .cloned()
        .collect();
      report.rules += store.set_rules(disease_code, codes).await.into_core()?.len();
    }
  }

  if counts.solutions == 0 {
    for (disease_code, lines) in &seed.solutions {
      if store.get_disease(disease_code).await.into_core()?.is_none() {
        warn!(disease = %disease_code, "skipping solution seed for missing disease");
        continue;
      }
      report.solutions += store
        .set_solutions(disease_code, lines.clone())
        .await
        .into_core()?
        .len();
    }
  }

  if !report.is_empty() {
    info!(?report, "seeded knowledge base");
  }
  Ok(report)
}
