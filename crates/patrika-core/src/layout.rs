//! Page layouts: the five site redesigns, keyed by publication year.
//!
//! Years are in the Bikram Sambat calendar the site publishes under. Each
//! layout covers a closed interval; the intervals are contiguous and
//! disjoint, so every supported year resolves to exactly one layout.

use std::{fmt, ops::RangeInclusive};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One of the five page layouts, named after the first year it covers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
  Era2015,
  Era2045,
  Era2051,
  Era2062,
  Era2073,
}

impl Layout {
  /// Every layout, oldest first.
  pub const ALL: [Layout; 5] = [
    Layout::Era2015,
    Layout::Era2045,
    Layout::Era2051,
    Layout::Era2062,
    Layout::Era2073,
  ];

  /// The closed interval of publication years this layout covers.
  pub fn years(self) -> RangeInclusive<i32> {
    match self {
      Self::Era2015 => 2015..=2044,
      Self::Era2045 => 2045..=2050,
      Self::Era2051 => 2051..=2061,
      Self::Era2062 => 2062..=2072,
      Self::Era2073 => 2073..=2080,
    }
  }

  /// Select the layout for a publication year.
  pub fn resolve(year: i32) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|layout| layout.years().contains(&year))
      .ok_or(Error::UnsupportedYear(year))
  }
}

impl fmt::Display for Layout {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let years = self.years();
    write!(f, "{}-{}", years.start(), years.end())
  }
}
