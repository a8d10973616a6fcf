//! Integration tests for `SqliteStore` against an in-memory database, and for
//! the diagnosis service running on top of it.

use std::sync::Arc;

use somnia_core::{
  Diagnoser, Error as CoreError, ErrorKind, StartRequest,
  engine::{NO_MATCH_NOTE, UNSATISFIED_NOTE, Verdict},
  history::{self, HistoryStatus, NewHistoryEntry},
  knowledge::{Disease, DiseaseUpdate, Symptom},
  seed::{SeedData, seed_if_empty},
  session::{Biodata, SearchMode, SessionStatus},
  store::{DiagnosisStore, HistoryQuery},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn disease(code: &str, name: &str, priority: i64) -> Disease {
  Disease {
    code: code.into(),
    name: name.into(),
    description: String::new(),
    priority,
  }
}

fn symptom(code: &str) -> Symptom {
  Symptom { code: code.into(), question: format!("Do you have {code}?") }
}

fn codes(list: &[&str]) -> Vec<String> { list.iter().map(|s| (*s).to_owned()).collect() }

/// P01 (priority 10, [G01, G02]) and P02 (priority 20, [G01, G03]).
async fn scenario_store() -> SqliteStore {
  let s = store().await;
  for code in ["G01", "G02", "G03"] {
    s.create_symptom(symptom(code)).await.unwrap();
  }
  s.create_disease(disease("P01", "Insomnia", 10)).await.unwrap();
  s.create_disease(disease("P02", "Sleep Apnea", 20)).await.unwrap();
  s.set_rules("P01", codes(&["G01", "G02"])).await.unwrap();
  s.set_rules("P02", codes(&["G01", "G03"])).await.unwrap();
  s.set_solutions("P01", codes(&["Keep a regular sleep schedule."]))
    .await
    .unwrap();
  s
}

async fn diagnoser() -> Diagnoser<SqliteStore> { Diagnoser::new(Arc::new(scenario_store().await)) }

fn biodata() -> Biodata {
  Biodata {
    name:    "Sari".into(),
    age:     34,
    gender:  "female".into(),
    address: "Yogyakarta".into(),
  }
}

fn core(err: Error) -> CoreError { err.into() }

// ─── Knowledge base ──────────────────────────────────────────────────────────

#[tokio::test]
async fn diseases_are_listed_in_hypothesis_order() {
  let s = store().await;
  s.create_disease(disease("P03", "Narcolepsy", 30)).await.unwrap();
  s.create_disease(disease("P02", "Sleep Apnea", 10)).await.unwrap();
  s.create_disease(disease("P01", "Insomnia", 10)).await.unwrap();

  let order: Vec<_> = s
    .list_diseases()
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.code)
    .collect();
  assert_eq!(order, ["P01", "P02", "P03"]);
}

#[tokio::test]
async fn create_disease_rejects_duplicates_and_bad_codes() {
  let s = store().await;
  s.create_disease(disease("P01", "Insomnia", 10)).await.unwrap();

  let dup = s.create_disease(disease("P01", "Again", 20)).await.unwrap_err();
  assert!(matches!(core(dup), CoreError::DuplicateDisease(code) if code == "P01"));

  let bad = s.create_disease(disease("X1", "Bad", 20)).await.unwrap_err();
  assert_eq!(core(bad).kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn update_and_delete_missing_disease_is_not_found() {
  let s = store().await;
  let update = DiseaseUpdate {
    name:        "Ghost".into(),
    description: String::new(),
    priority:    1,
  };
  let err = s.update_disease("P09", update).await.unwrap_err();
  assert!(matches!(core(err), CoreError::DiseaseNotFound(_)));

  let err = s.delete_disease("P09").await.unwrap_err();
  assert!(matches!(core(err), CoreError::DiseaseNotFound(_)));
}

#[tokio::test]
async fn update_disease_changes_fields() {
  let s = scenario_store().await;
  let update = DiseaseUpdate {
    name:        "Chronic Insomnia".into(),
    description: "Long-term".into(),
    priority:    5,
  };
  let updated = s.update_disease("P01", update).await.unwrap();
  assert_eq!(updated.name, "Chronic Insomnia");

  let fetched = s.get_disease("P01").await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn set_rules_replaces_in_order() {
  let s = scenario_store().await;
  let rules = s.set_rules("P01", codes(&["G03", "G01"])).await.unwrap();
  assert_eq!(rules.len(), 2);
  assert_eq!(rules[0].symptom_code, "G03");
  assert_eq!(rules[0].sort_order, 0);
  assert_eq!(rules[1].symptom_code, "G01");

  let listed = s.list_rules("P01").await.unwrap();
  assert_eq!(listed, rules);
}

#[tokio::test]
async fn set_rules_with_unknown_symptom_writes_nothing() {
  let s = scenario_store().await;
  let err = s.set_rules("P01", codes(&["G01", "G42"])).await.unwrap_err();
  assert!(matches!(
    core(err),
    CoreError::UnknownRuleSymptom { symptom, .. } if symptom == "G42"
  ));

  let kept: Vec<_> = s
    .list_rules("P01")
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.symptom_code)
    .collect();
  assert_eq!(kept, ["G01", "G02"]);
}

#[tokio::test]
async fn set_rules_rejects_repeated_symptom() {
  let s = scenario_store().await;
  let err = s.set_rules("P01", codes(&["G01", "G01"])).await.unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateRuleSymptom { .. }));
}

#[tokio::test]
async fn set_rules_for_missing_disease_is_not_found() {
  let s = scenario_store().await;
  let err = s.set_rules("P07", codes(&["G01"])).await.unwrap_err();
  assert!(matches!(core(err), CoreError::DiseaseNotFound(_)));
}

#[tokio::test]
async fn deleting_a_symptom_cascades_to_rules() {
  let s = scenario_store().await;
  s.delete_symptom("G01").await.unwrap();

  let p01: Vec<_> = s
    .list_rules("P01")
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.symptom_code)
    .collect();
  assert_eq!(p01, ["G02"]);
  assert!(s.get_symptom("G01").await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_disease_cascades_to_rules_and_solutions() {
  let s = scenario_store().await;
  s.delete_disease("P01").await.unwrap();

  assert!(s.list_rules("P01").await.unwrap().is_empty());
  assert!(s.list_solutions("P01").await.unwrap().is_empty());
  let counts = s.count_knowledge().await.unwrap();
  assert_eq!(counts.diseases, 1);
  assert_eq!(counts.rules, 2);
  assert_eq!(counts.solutions, 0);
}

#[tokio::test]
async fn set_solutions_keeps_line_order() {
  let s = scenario_store().await;
  let lines = codes(&["First.", "Second.", "Third."]);
  s.set_solutions("P02", lines.clone()).await.unwrap();

  let texts: Vec<_> = s
    .list_solutions("P02")
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.text)
    .collect();
  assert_eq!(texts, lines);

  let err = s.set_solutions("P02", codes(&["  "])).await.unwrap_err();
  assert_eq!(core(err).kind(), ErrorKind::Validation);
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seeding_is_idempotent() {
  let s = store().await;
  let seed = SeedData::default();

  let first = seed_if_empty(&s, &seed).await.unwrap();
  assert_eq!(first.diseases, seed.diseases.len());
  assert_eq!(first.symptoms, seed.symptoms.len());
  assert!(first.rules > 0);

  let second = seed_if_empty(&s, &seed).await.unwrap();
  assert!(second.is_empty());

  let counts = s.count_knowledge().await.unwrap();
  assert_eq!(counts.diseases, seed.diseases.len());
}

#[tokio::test]
async fn seeding_fills_only_empty_tables() {
  let s = store().await;
  s.create_symptom(symptom("G01")).await.unwrap();

  let report = seed_if_empty(&s, &SeedData::default()).await.unwrap();
  assert_eq!(report.symptoms, 0);
  assert!(report.diseases > 0);

  // Rules referring to symptoms other than G01 are dropped.
  for rule_set in [
    s.list_rules("P01").await.unwrap(),
    s.list_rules("P04").await.unwrap(),
  ] {
    assert!(rule_set.iter().all(|r| r.symptom_code == "G01"));
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upserting_an_answer_overwrites_and_bumps_version() {
  let d = diagnoser().await;
  let outcome = d.start(StartRequest::default()).await.unwrap();
  let id = outcome.session.session_id;
  assert_eq!(outcome.session.version, 0);

  d.answer(id, "G01", true).await.unwrap();
  let session = d.answer(id, "G01", false).await.unwrap();
  assert_eq!(session.version, 2);

  let answers = d.store().list_answers(id).await.unwrap();
  assert_eq!(answers.len(), 1);
  assert!(!answers[0].value);
}

#[tokio::test]
async fn upsert_answer_for_missing_session_is_not_found() {
  let s = scenario_store().await;
  let err = s.upsert_answer(Uuid::new_v4(), "G01", true).await.unwrap_err();
  assert!(matches!(core(err), CoreError::SessionNotFound(_)));
}

#[tokio::test]
async fn stale_version_is_a_conflict() {
  let d = diagnoser().await;
  let stale = d.start(StartRequest::default()).await.unwrap().session;
  d.answer(stale.session_id, "G01", true).await.unwrap();

  let err = d.store().persist_session(&stale).await.unwrap_err();
  let err = core(err);
  assert!(matches!(err, CoreError::Conflict(id) if id == stale.session_id));
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn session_round_trips_mode_and_biodata() {
  let d = diagnoser().await;
  let outcome = d
    .start(StartRequest {
      biodata:      Some(biodata()),
      disease_code: Some("P02".into()),
    })
    .await
    .unwrap();

  let stored = d
    .store()
    .get_session(outcome.session.session_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored, outcome.session);
  assert_eq!(stored.mode, SearchMode::SingleHypothesis { disease_code: "P02".into() });
  assert_eq!(stored.biodata, Some(biodata()));
}

// ─── Diagnosis ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn proves_first_hypothesis() {
  let d = diagnoser().await;
  let outcome = d.start(StartRequest::default()).await.unwrap();
  let id = outcome.session.session_id;
  assert_eq!(outcome.question.unwrap().code, "G01");
  assert_eq!(outcome.progress.asked, 0);
  assert_eq!(outcome.progress.total, 2);

  let outcome = d.answer_and_step(id, "G01", true).await.unwrap();
  assert_eq!(outcome.question.unwrap().code, "G02");
  assert_eq!(outcome.session.current_disease_code.as_deref(), Some("P01"));

  let outcome = d.answer_and_step(id, "G02", true).await.unwrap();
  assert!(outcome.question.is_none());
  assert_eq!(outcome.session.status, SessionStatus::Done);
  let result = outcome.result.unwrap();
  assert_eq!(result.disease.unwrap().disease.code, "P01");
  assert_eq!(result.confidence, Some(100));
  let matched: Vec<_> = result.matched_symptoms.into_iter().map(|s| s.code).collect();
  assert_eq!(matched, ["G01", "G02"]);
  assert_eq!(result.solutions.len(), 1);
  assert!(result.note.is_none());
}

#[tokio::test]
async fn shared_negative_answer_ends_in_no_match() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;

  let outcome = d.answer_and_step(id, "G01", false).await.unwrap();
  assert_eq!(outcome.session.status, SessionStatus::Done);
  assert!(outcome.session.result_disease_code.is_none());
  let result = outcome.result.unwrap();
  assert!(result.disease.is_none());
  assert!(result.confidence.is_none());
  assert_eq!(result.note.as_deref(), Some(NO_MATCH_NOTE));
  assert_eq!(outcome.progress.asked, 0);
  assert_eq!(outcome.progress.total, 1);

  let history = d.store().list_history(&HistoryQuery::default()).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].status, HistoryStatus::NoMatch);
}

#[tokio::test]
async fn rejected_first_hypothesis_falls_through_to_the_next() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;

  d.answer(id, "G01", true).await.unwrap();
  let outcome = d.answer_and_step(id, "G02", false).await.unwrap();
  let question = outcome.question.unwrap();
  assert_eq!(question.code, "G03");
  assert_eq!(outcome.session.current_disease_code.as_deref(), Some("P02"));
  assert_eq!(outcome.progress.asked, 1);

  let outcome = d.answer_and_step(id, "G03", true).await.unwrap();
  assert_eq!(outcome.session.result_disease_code.as_deref(), Some("P02"));
}

#[tokio::test]
async fn finished_session_is_immutable() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;
  d.answer(id, "G01", true).await.unwrap();
  let done = d.answer_and_step(id, "G02", true).await.unwrap();

  let after = d.answer(id, "G02", false).await.unwrap();
  assert_eq!(after, done.session);

  let again = d.step(id).await.unwrap();
  assert_eq!(again.session, done.session);
  assert_eq!(again.result, done.result);

  let history = d.store().list_history(&HistoryQuery::default()).await.unwrap();
  assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn single_hypothesis_unsatisfied() {
  let d = diagnoser().await;
  let outcome = d
    .start(StartRequest {
      biodata:      Some(biodata()),
      disease_code: Some("P02".into()),
    })
    .await
    .unwrap();
  let id = outcome.session.session_id;
  assert_eq!(outcome.question.unwrap().code, "G01");

  d.answer(id, "G01", true).await.unwrap();
  let outcome = d.answer_and_step(id, "G03", false).await.unwrap();
  assert_eq!(outcome.session.status, SessionStatus::Unsatisfied);

  let result = outcome.result.unwrap();
  assert_eq!(result.disease.unwrap().disease.code, "P02");
  assert!(result.confidence.is_none());
  assert_eq!(result.note.as_deref(), Some(UNSATISFIED_NOTE));

  let entry = &d.store().list_history(&HistoryQuery::default()).await.unwrap()[0];
  assert_eq!(entry.status, HistoryStatus::Unsatisfied);
  assert_eq!(entry.disease_code.as_deref(), Some("P02"));
  assert_eq!(entry.biodata, Some(biodata()));
}

#[tokio::test]
async fn single_hypothesis_ignores_other_diseases() {
  let d = diagnoser().await;
  let id = d
    .start(StartRequest { biodata: None, disease_code: Some("P02".into()) })
    .await
    .unwrap()
    .session
    .session_id;

  d.answer(id, "G01", true).await.unwrap();
  let outcome = d.answer_and_step(id, "G03", true).await.unwrap();
  assert_eq!(outcome.session.status, SessionStatus::Done);
  assert_eq!(outcome.result.unwrap().confidence, Some(100));

  let entry = &d.store().list_history(&HistoryQuery::default()).await.unwrap()[0];
  assert_eq!(entry.status, HistoryStatus::Completed);
  assert_eq!(entry.disease_name.as_deref(), Some("Sleep Apnea"));
}

#[tokio::test]
async fn start_errors_write_nothing() {
  let d = Diagnoser::new(Arc::new(store().await));
  let err = d.start(StartRequest::default()).await.unwrap_err();
  assert!(matches!(err, CoreError::NoQuestion));

  let d = diagnoser().await;
  let err = d
    .start(StartRequest { biodata: None, disease_code: Some("P09".into()) })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  d.store()
    .create_disease(disease("P03", "Narcolepsy", 30))
    .await
    .unwrap();
  let err = d
    .start(StartRequest { biodata: None, disease_code: Some("P03".into()) })
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::EmptyRuleSet(_)));

  let mut nameless = biodata();
  nameless.name = " ".into();
  let err = d
    .start(StartRequest { biodata: Some(nameless), disease_code: None })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn answering_unknown_symptom_is_not_found() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;

  let err = d.answer(id, "G99", true).await.unwrap_err();
  assert!(matches!(err, CoreError::SymptomNotFound(_)));
  let err = d.answer(id, "nope", true).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  let err = d.answer(Uuid::new_v4(), "G01", true).await.unwrap_err();
  assert!(matches!(err, CoreError::SessionNotFound(_)));
}

// ─── History ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn history_survives_session_purge_and_rename() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;
  d.answer(id, "G01", true).await.unwrap();
  d.answer_and_step(id, "G02", true).await.unwrap();

  d.delete_session(id).await.unwrap();
  assert!(d.store().get_session(id).await.unwrap().is_none());
  assert!(d.store().list_answers(id).await.unwrap().is_empty());

  let update = DiseaseUpdate {
    name:        "Renamed".into(),
    description: String::new(),
    priority:    10,
  };
  d.store().update_disease("P01", update).await.unwrap();

  let history = d.store().list_history(&HistoryQuery::default()).await.unwrap();
  assert_eq!(history.len(), 1);
  let entry = &history[0];
  assert_eq!(entry.session_id, id);
  assert_eq!(entry.disease_name.as_deref(), Some("Insomnia"));

  let fetched = d.store().get_history(entry.history_id).await.unwrap();
  assert_eq!(fetched.as_ref(), Some(entry));

  let err = d.delete_session(id).await.unwrap_err();
  assert!(matches!(err, CoreError::SessionNotFound(_)));
}

#[tokio::test]
async fn history_is_newest_first_and_paged() {
  let d = diagnoser().await;
  for _ in 0..3 {
    let id = d.start(StartRequest::default()).await.unwrap().session.session_id;
    d.answer_and_step(id, "G01", false).await.unwrap();
  }

  let all = d.store().list_history(&HistoryQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
  assert!(all[0].history_id > all[1].history_id);

  let page = d
    .store()
    .list_history(&HistoryQuery { limit: Some(1), offset: Some(1) })
    .await
    .unwrap();
  assert_eq!(page.len(), 1);
  assert_eq!(page[0].history_id, all[1].history_id);

  assert!(d.store().get_history(9_999).await.unwrap().is_none());
}

#[tokio::test]
async fn concluded_session_survives_disease_deletion() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;
  d.answer(id, "G01", true).await.unwrap();
  d.answer_and_step(id, "G02", true).await.unwrap();

  d.store().delete_disease("P01").await.unwrap();

  let outcome = d.step(id).await.unwrap();
  assert_eq!(outcome.session.result_disease_code.as_deref(), Some("P01"));
  let result = outcome.result.unwrap();
  assert!(result.disease.is_none());
  assert_eq!(result.disease_code.as_deref(), Some("P01"));
  assert_eq!(result.disease_name.as_deref(), Some("Insomnia"));
  assert_eq!(result.confidence, Some(100));
  assert!(result.note.is_none());

  let again = d.step(id).await.unwrap();
  assert_eq!(again.result, Some(result));
}

#[tokio::test]
async fn history_paging_rejects_out_of_range_bounds() {
  let s = scenario_store().await;
  let query = HistoryQuery { limit: None, offset: Some(usize::MAX) };
  let err = core(s.list_history(&query).await.unwrap_err());
  assert!(matches!(err, CoreError::OutOfRange("history offset")));
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn appended_history_is_found_by_session() {
  let d = diagnoser().await;
  let session = d.start(StartRequest::default()).await.unwrap().session;
  let id = session.session_id;
  assert!(d.store().find_history_by_session(id).await.unwrap().is_none());

  let entry = NewHistoryEntry::snapshot(&session, HistoryStatus::NoMatch, None, "imported");
  let appended = d.store().append_history(entry).await.unwrap();

  let found = d.store().find_history_by_session(id).await.unwrap();
  assert_eq!(found, Some(appended));
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_history_write_leaves_session_asking() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;
  d.answer(id, "G01", true).await.unwrap();
  d.answer(id, "G02", true).await.unwrap();

  d.store()
    .execute_batch(
      "CREATE TRIGGER history_offline BEFORE INSERT ON history
       BEGIN SELECT RAISE(ABORT, 'history offline'); END;",
    )
    .await
    .unwrap();

  let err = d.step(id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Internal);
  let session = d.store().get_session(id).await.unwrap().unwrap();
  assert_eq!(session.status, SessionStatus::Asking);
  assert!(session.result_disease_code.is_none());

  d.store().execute_batch("DROP TRIGGER history_offline;").await.unwrap();

  let outcome = d.step(id).await.unwrap();
  assert_eq!(outcome.session.status, SessionStatus::Done);
  let history = d.store().list_history(&HistoryQuery::default()).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].disease_code.as_deref(), Some("P01"));
}

#[tokio::test]
async fn only_one_conclusion_of_a_version_wins() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;
  d.answer(id, "G01", true).await.unwrap();
  d.answer(id, "G02", true).await.unwrap();

  let mut first = d.store().get_session(id).await.unwrap().unwrap();
  let mut second = first.clone();
  Verdict::Proven("P01".into()).apply(&mut first);
  Verdict::NoMatch.apply(&mut second);

  let (stored, entry) = history::record(d.store(), &first, HistoryStatus::Completed, None, "won")
    .await
    .unwrap();
  assert_eq!(stored.version, first.version + 1);
  assert_eq!(entry.status, HistoryStatus::Completed);

  let err = history::record(d.store(), &second, HistoryStatus::NoMatch, None, "lost")
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Conflict(lost) if lost == id));

  let history = d.store().list_history(&HistoryQuery::default()).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].message, "won");
  let stored = d.store().get_session(id).await.unwrap().unwrap();
  assert_eq!(stored.result_disease_code.as_deref(), Some("P01"));
}

#[tokio::test]
async fn racing_steps_record_history_once() {
  let d = diagnoser().await;
  let id = d.start(StartRequest::default()).await.unwrap().session.session_id;
  d.answer(id, "G01", true).await.unwrap();
  d.answer(id, "G02", true).await.unwrap();

  let (a, b) = tokio::join!(d.step(id), d.step(id));
  let outcomes = [a, b];
  assert!(outcomes.iter().any(Result::is_ok));
  for outcome in &outcomes {
    match outcome {
      Ok(step) => assert_eq!(step.session.status, SessionStatus::Done),
      Err(err) => assert!(matches!(err, CoreError::Conflict(lost) if *lost == id)),
    }
  }

  let history = d.store().list_history(&HistoryQuery::default()).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].status, HistoryStatus::Completed);
}
