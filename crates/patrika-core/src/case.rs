//! Case types and the records the scraper produces.
//!
//! A [`CaseRecord`] is one parsed court decision keyed by its source URL. A
//! [`FailedLink`] is a detail page that could not be fetched or parsed,
//! keyed by `(case type, year, url)` and carrying a retry counter.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::{Error, numerals};

// ─── Case type ───────────────────────────────────────────────────────────────

/// The seven case categories the site's search form accepts.
///
/// The discriminant order matches the site's `mudda_type` parameter.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
  /// दुनियाबादी देवानी: civil, private plaintiff.
  PrivateCivil,
  /// सरकारबादी देवानी: civil, government plaintiff.
  GovernmentCivil,
  /// दुनियावादी फौजदारी: criminal, private plaintiff.
  PrivateCriminal,
  /// सरकारवादी फौजदारी: criminal, government plaintiff.
  GovernmentCriminal,
  /// रिट
  Writ,
  /// निवेदन
  Petition,
  /// विविध
  Miscellaneous,
}

impl CaseType {
  /// The site's numeric code, `1..=7`.
  pub fn number(self) -> u8 {
    match self {
      Self::PrivateCivil => 1,
      Self::GovernmentCivil => 2,
      Self::PrivateCriminal => 3,
      Self::GovernmentCriminal => 4,
      Self::Writ => 5,
      Self::Petition => 6,
      Self::Miscellaneous => 7,
    }
  }

  /// The Nepali label shown on the site and stored in the database.
  pub fn name(self) -> &'static str {
    match self {
      Self::PrivateCivil => "दुनियाबादी देवानी",
      Self::GovernmentCivil => "सरकारबादी देवानी",
      Self::PrivateCriminal => "दुनियावादी फौजदारी",
      Self::GovernmentCriminal => "सरकारवादी फौजदारी",
      Self::Writ => "रिट",
      Self::Petition => "निवेदन",
      Self::Miscellaneous => "विविध",
    }
  }

  pub fn from_number(n: u8) -> Option<Self> {
    Self::iter().find(|t| t.number() == n)
  }

  pub fn from_name(name: &str) -> Option<Self> {
    let name = numerals::normalize_text(name);
    Self::iter().find(|t| t.name() == name)
  }
}

impl fmt::Display for CaseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Accepts the Nepali label, the numeric code in either digit system, or
/// the snake_case variant name (`writ`, `private_civil`, ...).
impl FromStr for CaseType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if let Ok(n) = numerals::to_ascii_digits(trimmed).parse::<u8>() {
      return Self::from_number(n)
        .ok_or_else(|| Error::UnknownCaseType(s.to_owned()));
    }
    if let Some(t) = Self::from_name(trimmed) {
      return Ok(t);
    }
    serde_json::from_value(serde_json::Value::String(trimmed.to_lowercase()))
      .map_err(|_| Error::UnknownCaseType(s.to_owned()))
  }
}

// ─── Extracted fields ────────────────────────────────────────────────────────

/// Everything the page parser extracts from a detail page.
///
/// Multi-valued fields are always lists, even when the page renders a single
/// value, so consumers see one shape regardless of cardinality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFields {
  pub decision_number: Option<String>,
  /// भाग
  pub volume:          Option<String>,
  /// महिना
  pub month:           Option<String>,
  /// अंक
  pub issue:           Option<String>,
  pub decision_date:   Option<String>,
  /// Court or bench heading.
  pub court:           Option<String>,
  pub order_date:      Option<String>,
  pub subject:         Option<String>,
  pub judges:          Vec<String>,
  pub case_numbers:    Vec<String>,
  pub applicants:      Vec<String>,
  pub opponents:       Vec<String>,
  /// Numbered paragraphs of the decision body.
  pub case_details:    Vec<String>,
  /// The operative order, from its heading to the end of the page.
  pub verdict:         Vec<String>,
}

impl CaseFields {
  /// True when nothing at all was extracted.
  pub fn is_empty(&self) -> bool {
    let scalars = [
      &self.decision_number,
      &self.volume,
      &self.month,
      &self.issue,
      &self.decision_date,
      &self.court,
      &self.order_date,
      &self.subject,
    ];
    let lists = [
      &self.judges,
      &self.case_numbers,
      &self.applicants,
      &self.opponents,
      &self.case_details,
      &self.verdict,
    ];
    scalars.iter().all(|s| s.is_none()) && lists.iter().all(|l| l.is_empty())
  }

  /// Apply [`numerals::normalize_text`] to every value, dropping scalars and
  /// list entries that normalise to the empty string.
  pub fn normalize(&mut self) {
    for scalar in [
      &mut self.decision_number,
      &mut self.volume,
      &mut self.month,
      &mut self.issue,
      &mut self.decision_date,
      &mut self.court,
      &mut self.order_date,
      &mut self.subject,
    ] {
      *scalar = scalar
        .take()
        .map(|s| numerals::normalize_text(&s))
        .filter(|s| !s.is_empty());
    }
    for list in [
      &mut self.judges,
      &mut self.case_numbers,
      &mut self.applicants,
      &mut self.opponents,
      &mut self.case_details,
      &mut self.verdict,
    ] {
      *list = list
        .drain(..)
        .map(|s| numerals::normalize_text(&s))
        .filter(|s| !s.is_empty())
        .collect();
    }
  }
}

// ─── Case record ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::CaseStore::upsert_case`].
/// `created_at` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewCase {
  pub source_url:    String,
  pub case_type:     CaseType,
  /// Publication year the case was listed under.
  pub year:          i32,
  /// Where the raw page was saved; a weak, lookup-only reference.
  pub snapshot_path: Option<String>,
  pub fields:        CaseFields,
}

/// A persisted decision. Re-scraping the same URL replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
  pub source_url:    String,
  pub case_type:     CaseType,
  pub year:          i32,
  pub snapshot_path: Option<String>,
  #[serde(flatten)]
  pub fields:        CaseFields,
  pub created_at:    DateTime<Utc>,
}

// ─── Failed link ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::CaseStore::record_failure`].
#[derive(Debug, Clone)]
pub struct NewFailure {
  pub case_type:     CaseType,
  pub year:          i32,
  pub source_url:    String,
  pub error_message: String,
}

/// A link that could not be fetched or parsed. `retry_count` only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLink {
  pub case_type:       CaseType,
  pub year:            i32,
  pub source_url:      String,
  pub error_message:   String,
  pub retry_count:     u32,
  pub created_at:      DateTime<Utc>,
  pub last_attempt_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn case_type_parses_every_spelling() {
    assert_eq!("5".parse::<CaseType>().unwrap(), CaseType::Writ);
    assert_eq!("५".parse::<CaseType>().unwrap(), CaseType::Writ);
    assert_eq!("रिट".parse::<CaseType>().unwrap(), CaseType::Writ);
    assert_eq!(
      "दुनियाबादी  देवानी".parse::<CaseType>().unwrap(),
      CaseType::PrivateCivil
    );
    assert_eq!(
      "government_criminal".parse::<CaseType>().unwrap(),
      CaseType::GovernmentCriminal
    );
  }

  #[test]
  fn case_type_rejects_unknown_values() {
    assert!(matches!("0".parse::<CaseType>(), Err(Error::UnknownCaseType(_))));
    assert!(matches!("8".parse::<CaseType>(), Err(Error::UnknownCaseType(_))));
    assert!(matches!("घर".parse::<CaseType>(), Err(Error::UnknownCaseType(_))));
  }

  #[test]
  fn case_type_numbers_are_one_through_seven() {
    let numbers: Vec<u8> = CaseType::iter().map(CaseType::number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
  }

  #[test]
  fn empty_fields_are_detected() {
    let mut fields = CaseFields::default();
    assert!(fields.is_empty());
    fields.verdict.push("फैसला".into());
    assert!(!fields.is_empty());
  }

  #[test]
  fn normalize_converts_digits_and_drops_blanks() {
    let mut fields = CaseFields {
      decision_number: Some(" ९५४२ ".into()),
      subject:         Some("   ".into()),
      judges:          vec!["माननीय  न्यायाधीश".into(), " ".into()],
      ..Default::default()
    };
    fields.normalize();
    assert_eq!(fields.decision_number.as_deref(), Some("9542"));
    assert_eq!(fields.subject, None);
    assert_eq!(fields.judges, vec!["माननीय न्यायाधीश".to_string()]);
  }
}
