//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Multi-valued fields are
//! stored as compact JSON arrays. Case types are stored as their Nepali
//! label so the database reads naturally without this crate.

use chrono::{DateTime, Utc};
use patrika_core::case::{CaseFields, CaseRecord, CaseType, FailedLink};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CaseType ────────────────────────────────────────────────────────────────

pub fn encode_case_type(t: CaseType) -> &'static str { t.name() }

pub fn decode_case_type(s: &str) -> Result<CaseType> {
  CaseType::from_name(s).ok_or_else(|| Error::Corrupt {
    column: "case_type",
    value:  s.to_owned(),
  })
}

// ─── Lists ───────────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that feeds [`RawCase`].
pub const CASE_COLUMNS: &str = "source_url, case_type, year, snapshot_path,
  decision_number, volume, month, issue, decision_date, court, order_date,
  subject, judges, case_number, applicant, opponent, case_details, verdict,
  created_at";

/// Raw values read directly from a `cases` row, in [`CASE_COLUMNS`] order.
pub struct RawCase {
  pub source_url:      String,
  pub case_type:       String,
  pub year:            i32,
  pub snapshot_path:   Option<String>,
  pub decision_number: Option<String>,
  pub volume:          Option<String>,
  pub month:           Option<String>,
  pub issue:           Option<String>,
  pub decision_date:   Option<String>,
  pub court:           Option<String>,
  pub order_date:      Option<String>,
  pub subject:         Option<String>,
  pub judges:          String,
  pub case_numbers:    String,
  pub applicants:      String,
  pub opponents:       String,
  pub case_details:    String,
  pub verdict:         String,
  pub created_at:      String,
}

impl RawCase {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      source_url:      row.get(0)?,
      case_type:       row.get(1)?,
      year:            row.get(2)?,
      snapshot_path:   row.get(3)?,
      decision_number: row.get(4)?,
      volume:          row.get(5)?,
      month:           row.get(6)?,
      issue:           row.get(7)?,
      decision_date:   row.get(8)?,
      court:           row.get(9)?,
      order_date:      row.get(10)?,
      subject:         row.get(11)?,
      judges:          row.get(12)?,
      case_numbers:    row.get(13)?,
      applicants:      row.get(14)?,
      opponents:       row.get(15)?,
      case_details:    row.get(16)?,
      verdict:         row.get(17)?,
      created_at:      row.get(18)?,
    })
  }

  pub fn into_record(self) -> Result<CaseRecord> {
    let fields = CaseFields {
      decision_number: self.decision_number,
      volume:          self.volume,
      month:           self.month,
      issue:           self.issue,
      decision_date:   self.decision_date,
      court:           self.court,
      order_date:      self.order_date,
      subject:         self.subject,
      judges:          decode_list(&self.judges)?,
      case_numbers:    decode_list(&self.case_numbers)?,
      applicants:      decode_list(&self.applicants)?,
      opponents:       decode_list(&self.opponents)?,
      case_details:    decode_list(&self.case_details)?,
      verdict:         decode_list(&self.verdict)?,
    };

    Ok(CaseRecord {
      source_url: self.source_url,
      case_type: decode_case_type(&self.case_type)?,
      year: self.year,
      snapshot_path: self.snapshot_path,
      fields,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list shared by every `SELECT`/`RETURNING` that feeds
/// [`RawFailedLink`].
pub const FAILURE_COLUMNS: &str = "case_type, year, source_url, error_message,
  retry_count, created_at, last_attempt_at";

/// Raw values read directly from a `failed_links` row.
pub struct RawFailedLink {
  pub case_type:       String,
  pub year:            i32,
  pub source_url:      String,
  pub error_message:   String,
  pub retry_count:     i64,
  pub created_at:      String,
  pub last_attempt_at: String,
}

impl RawFailedLink {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      case_type:       row.get(0)?,
      year:            row.get(1)?,
      source_url:      row.get(2)?,
      error_message:   row.get(3)?,
      retry_count:     row.get(4)?,
      created_at:      row.get(5)?,
      last_attempt_at: row.get(6)?,
    })
  }

  pub fn into_failed_link(self) -> Result<FailedLink> {
    let retry_count = u32::try_from(self.retry_count).map_err(|_| {
      Error::Corrupt {
        column: "retry_count",
        value:  self.retry_count.to_string(),
      }
    })?;

    Ok(FailedLink {
      case_type: decode_case_type(&self.case_type)?,
      year: self.year,
      source_url: self.source_url,
      error_message: self.error_message,
      retry_count,
      created_at: decode_dt(&self.created_at)?,
      last_attempt_at: decode_dt(&self.last_attempt_at)?,
    })
  }
}
