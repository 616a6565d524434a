//! [`SqliteStore`], the SQLite implementation of [`CaseStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use patrika_core::{
  case::{CaseRecord, CaseType, FailedLink, NewCase, NewFailure},
  store::CaseStore,
};

use crate::{
  encode::{
    CASE_COLUMNS, FAILURE_COLUMNS, RawCase, RawFailedLink, encode_case_type,
    encode_dt, encode_list,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Patrika case store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised on the connection's worker thread, and each write runs in
/// its own transaction.
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

  /// Open an in-memory store.
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
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_case(&self, input: NewCase) -> Result<CaseRecord> {
    let record = CaseRecord {
      source_url:    input.source_url,
      case_type:     input.case_type,
      year:          input.year,
      snapshot_path: input.snapshot_path,
      fields:        input.fields,
      created_at:    Utc::now(),
    };

    let url          = record.source_url.clone();
    let case_type    = encode_case_type(record.case_type);
    let year         = record.year;
    let snapshot     = record.snapshot_path.clone();
    let f            = record.fields.clone();
    let judges       = encode_list(&f.judges)?;
    let case_numbers = encode_list(&f.case_numbers)?;
    let applicants   = encode_list(&f.applicants)?;
    let opponents    = encode_list(&f.opponents)?;
    let details      = encode_list(&f.case_details)?;
    let verdict      = encode_list(&f.verdict)?;
    let created_at   = encode_dt(record.created_at);

    let cleared = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO cases (
             source_url, case_type, year, snapshot_path,
             decision_number, volume, month, issue, decision_date,
             court, order_date, subject,
             judges, case_number, applicant, opponent, case_details, verdict,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19)
           ON CONFLICT(source_url) DO UPDATE SET
             case_type       = excluded.case_type,
             year            = excluded.year,
             snapshot_path   = excluded.snapshot_path,
             decision_number = excluded.decision_number,
             volume          = excluded.volume,
             month           = excluded.month,
             issue           = excluded.issue,
             decision_date   = excluded.decision_date,
             court           = excluded.court,
             order_date      = excluded.order_date,
             subject         = excluded.subject,
             judges          = excluded.judges,
             case_number     = excluded.case_number,
             applicant       = excluded.applicant,
             opponent        = excluded.opponent,
             case_details    = excluded.case_details,
             verdict         = excluded.verdict,
             created_at      = excluded.created_at",
          rusqlite::params![
            url,
            case_type,
            year,
            snapshot,
            f.decision_number,
            f.volume,
            f.month,
            f.issue,
            f.decision_date,
            f.court,
            f.order_date,
            f.subject,
            judges,
            case_numbers,
            applicants,
            opponents,
            details,
            verdict,
            created_at,
          ],
        )?;
        let cleared = tx.execute(
          "DELETE FROM failed_links
           WHERE case_type = ?1 AND year = ?2 AND source_url = ?3",
          rusqlite::params![case_type, year, url],
        )?;
        tx.commit()?;
        Ok(cleared)
      })
      .await?;

    if cleared > 0 {
      debug!(url = %record.source_url, "cleared earlier failure");
    }

    Ok(record)
  }

  async fn record_failure(&self, input: NewFailure) -> Result<FailedLink> {
    let case_type = encode_case_type(input.case_type);
    let now       = encode_dt(Utc::now());

    let raw: RawFailedLink = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO failed_links (
             case_type, year, source_url, error_message,
             retry_count, created_at, last_attempt_at
           ) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
           ON CONFLICT(case_type, year, source_url) DO UPDATE SET
             retry_count     = retry_count + 1,
             error_message   = excluded.error_message,
             last_attempt_at = excluded.last_attempt_at
           RETURNING {FAILURE_COLUMNS}"
        );
        Ok(conn.query_row(
          &sql,
          rusqlite::params![
            case_type,
            input.year,
            input.source_url,
            input.error_message,
            now,
          ],
          RawFailedLink::from_row,
        )?)
      })
      .await?;

    raw.into_failed_link()
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_case(&self, source_url: &str) -> Result<Option<CaseRecord>> {
    let url = source_url.to_owned();

    let raw: Option<RawCase> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CASE_COLUMNS} FROM cases WHERE source_url = ?1"),
            rusqlite::params![url],
            RawCase::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCase::into_record).transpose()
  }

  async fn has_case(&self, source_url: &str) -> Result<bool> {
    let url = source_url.to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM cases WHERE source_url = ?1",
            rusqlite::params![url],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;

    Ok(exists)
  }

  async fn count_cases(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM cases", [], |r| r.get(0))?)
      })
      .await?;

    Ok(n.max(0) as u64)
  }

  async fn get_failure(
    &self,
    case_type:  CaseType,
    year:       i32,
    source_url: &str,
  ) -> Result<Option<FailedLink>> {
    let case_type = encode_case_type(case_type);
    let url       = source_url.to_owned();

    let raw: Option<RawFailedLink> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {FAILURE_COLUMNS} FROM failed_links
               WHERE case_type = ?1 AND year = ?2 AND source_url = ?3"
            ),
            rusqlite::params![case_type, year, url],
            RawFailedLink::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFailedLink::into_failed_link).transpose()
  }

  async fn list_failures(
    &self,
    case_type: Option<CaseType>,
    year:      Option<i32>,
  ) -> Result<Vec<FailedLink>> {
    let case_type = case_type.map(encode_case_type);

    let raws: Vec<RawFailedLink> = self
      .conn
      .call(move |conn| {
        // NULL parameters disable their filter.
        let mut stmt = conn.prepare(&format!(
          "SELECT {FAILURE_COLUMNS} FROM failed_links
           WHERE (?1 IS NULL OR case_type = ?1)
             AND (?2 IS NULL OR year = ?2)
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![case_type, year], RawFailedLink::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFailedLink::into_failed_link).collect()
  }
}
