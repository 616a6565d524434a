//! The `CaseStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `patrika-store-sqlite`).
//! The scraper depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::case::{CaseRecord, CaseType, FailedLink, NewCase, NewFailure};

/// Abstraction over a Patrika case store backend.
///
/// Every write is atomic: a concurrent reader sees either the state before
/// the call or the state after it, never a partial write.
///
/// All methods return `Send` futures so jobs holding a store can run on a
/// multi-threaded tokio runtime.
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert or fully replace the case keyed by `input.source_url`, and clear
  /// any failed-link row with identity `(case_type, year, source_url)`.
  fn upsert_case(
    &self,
    input: NewCase,
  ) -> impl Future<Output = Result<CaseRecord, Self::Error>> + Send + '_;

  /// Record a failed attempt. A new identity starts at `retry_count = 1`;
  /// an existing one is incremented and its message and timestamp replaced.
  fn record_failure(
    &self,
    input: NewFailure,
  ) -> impl Future<Output = Result<FailedLink, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a case by source URL. Returns `None` if not found.
  fn get_case<'a>(
    &'a self,
    source_url: &'a str,
  ) -> impl Future<Output = Result<Option<CaseRecord>, Self::Error>> + Send + 'a;

  /// Whether a case with this source URL has been stored.
  fn has_case<'a>(
    &'a self,
    source_url: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Total number of stored cases.
  fn count_cases(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Retrieve a failed link by its full identity.
  fn get_failure<'a>(
    &'a self,
    case_type: CaseType,
    year: i32,
    source_url: &'a str,
  ) -> impl Future<Output = Result<Option<FailedLink>, Self::Error>> + Send + 'a;

  /// List failed links, optionally filtered by case type and/or year, oldest
  /// first.
  fn list_failures(
    &self,
    case_type: Option<CaseType>,
    year: Option<i32>,
  ) -> impl Future<Output = Result<Vec<FailedLink>, Self::Error>> + Send + '_;
}
