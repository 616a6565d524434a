//! Integration tests for `SqliteStore` against an in-memory database.

use patrika_core::{
  case::{CaseFields, CaseType, NewCase, NewFailure},
  store::CaseStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

const URL_A: &str = "https://nkp.gov.np/full_detail/101";
const URL_B: &str = "https://nkp.gov.np/full_detail/102";

fn new_case(url: &str, decision_number: &str) -> NewCase {
  NewCase {
    source_url:    url.into(),
    case_type:     CaseType::Writ,
    year:          2073,
    snapshot_path: Some("scraped_html/5_2073_101.html".into()),
    fields:        CaseFields {
      decision_number: Some(decision_number.into()),
      court:           Some("सर्वोच्च अदालत, संयुक्त इजलास".into()),
      judges:          vec!["माननीय न्यायाधीश श्री क".into()],
      applicants:      vec!["राम".into(), "श्याम".into()],
      opponents:       vec!["नेपाल सरकार".into()],
      verdict:         vec!["रिट खारेज हुने".into()],
      ..Default::default()
    },
  }
}

fn failure(url: &str, message: &str) -> NewFailure {
  NewFailure {
    case_type:     CaseType::Writ,
    year:          2073,
    source_url:    url.into(),
    error_message: message.into(),
  }
}

// ─── Cases ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_get_case() {
  let s = store().await;

  let stored = s.upsert_case(new_case(URL_A, "9542")).await.unwrap();
  assert_eq!(stored.fields.decision_number.as_deref(), Some("9542"));

  let fetched = s.get_case(URL_A).await.unwrap().unwrap();
  assert_eq!(fetched.case_type, CaseType::Writ);
  assert_eq!(fetched.year, 2073);
  assert_eq!(fetched.fields.applicants, vec!["राम", "श्याम"]);
  assert_eq!(fetched.fields.subject, None);
  assert!(fetched.fields.case_numbers.is_empty());
  assert_eq!(fetched.fields, stored.fields);
}

#[tokio::test]
async fn get_case_missing_returns_none() {
  let s = store().await;
  assert!(s.get_case(URL_A).await.unwrap().is_none());
  assert!(!s.has_case(URL_A).await.unwrap());
}

#[tokio::test]
async fn upsert_replaces_existing_row() {
  let s = store().await;
  s.upsert_case(new_case(URL_A, "1111")).await.unwrap();

  let mut second = new_case(URL_A, "2222");
  second.fields.applicants = vec!["हरि".into()];
  second.snapshot_path = None;
  s.upsert_case(second).await.unwrap();

  assert_eq!(s.count_cases().await.unwrap(), 1);
  let fetched = s.get_case(URL_A).await.unwrap().unwrap();
  assert_eq!(fetched.fields.decision_number.as_deref(), Some("2222"));
  assert_eq!(fetched.fields.applicants, vec!["हरि"]);
  assert_eq!(fetched.snapshot_path, None);
}

#[tokio::test]
async fn count_and_has_case() {
  let s = store().await;
  s.upsert_case(new_case(URL_A, "1")).await.unwrap();
  s.upsert_case(new_case(URL_B, "2")).await.unwrap();

  assert_eq!(s.count_cases().await.unwrap(), 2);
  assert!(s.has_case(URL_A).await.unwrap());
  assert!(s.has_case(URL_B).await.unwrap());
  assert!(!s.has_case("https://nkp.gov.np/full_detail/999").await.unwrap());
}

// ─── Failed links ────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_failure_starts_at_one() {
  let s = store().await;
  let link = s.record_failure(failure(URL_A, "HTTP 404")).await.unwrap();
  assert_eq!(link.retry_count, 1);
  assert_eq!(link.error_message, "HTTP 404");
  assert_eq!(link.created_at, link.last_attempt_at);
}

#[tokio::test]
async fn repeated_failures_increment_and_keep_latest_message() {
  let s = store().await;
  for n in 1..=4u32 {
    let link = s
      .record_failure(failure(URL_A, &format!("attempt {n}")))
      .await
      .unwrap();
    assert_eq!(link.retry_count, n);
  }

  let link = s
    .get_failure(CaseType::Writ, 2073, URL_A)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(link.retry_count, 4);
  assert_eq!(link.error_message, "attempt 4");
  assert!(link.last_attempt_at >= link.created_at);
  assert_eq!(s.list_failures(None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failure_identity_includes_type_and_year() {
  let s = store().await;
  s.record_failure(failure(URL_A, "a")).await.unwrap();

  let mut other_year = failure(URL_A, "b");
  other_year.year = 2074;
  let link = s.record_failure(other_year).await.unwrap();
  assert_eq!(link.retry_count, 1);

  let mut other_type = failure(URL_A, "c");
  other_type.case_type = CaseType::Petition;
  let link = s.record_failure(other_type).await.unwrap();
  assert_eq!(link.retry_count, 1);

  assert_eq!(s.list_failures(None, None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn successful_upsert_clears_failure() {
  let s = store().await;
  s.record_failure(failure(URL_A, "timeout")).await.unwrap();
  s.record_failure(failure(URL_B, "timeout")).await.unwrap();

  s.upsert_case(new_case(URL_A, "9542")).await.unwrap();

  assert!(s
    .get_failure(CaseType::Writ, 2073, URL_A)
    .await
    .unwrap()
    .is_none());
  assert!(s
    .get_failure(CaseType::Writ, 2073, URL_B)
    .await
    .unwrap()
    .is_some());
}

#[tokio::test]
async fn upsert_leaves_failures_of_other_jobs() {
  let s = store().await;
  let mut other = failure(URL_A, "timeout");
  other.year = 2074;
  s.record_failure(other).await.unwrap();

  s.upsert_case(new_case(URL_A, "9542")).await.unwrap();

  let remaining = s.list_failures(None, None).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].year, 2074);
}

#[tokio::test]
async fn list_failures_filters() {
  let s = store().await;
  s.record_failure(failure(URL_A, "a")).await.unwrap();
  s.record_failure(failure(URL_B, "b")).await.unwrap();
  let mut civil = failure(URL_A, "c");
  civil.case_type = CaseType::PrivateCivil;
  civil.year = 2050;
  s.record_failure(civil).await.unwrap();

  let writs = s.list_failures(Some(CaseType::Writ), None).await.unwrap();
  assert_eq!(writs.len(), 2);
  assert!(writs.iter().all(|f| f.case_type == CaseType::Writ));
  assert_eq!(writs[0].source_url, URL_A);
  assert_eq!(writs[1].source_url, URL_B);

  let by_year = s.list_failures(None, Some(2050)).await.unwrap();
  assert_eq!(by_year.len(), 1);
  assert_eq!(by_year[0].case_type, CaseType::PrivateCivil);

  let none = s
    .list_failures(Some(CaseType::Petition), Some(2073))
    .await
    .unwrap();
  assert!(none.is_empty());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_rows() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cases.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.upsert_case(new_case(URL_A, "9542")).await.unwrap();
    s.record_failure(failure(URL_B, "HTTP 500")).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.count_cases().await.unwrap(), 1);
  let link = s.record_failure(failure(URL_B, "HTTP 502")).await.unwrap();
  assert_eq!(link.retry_count, 2);
}
