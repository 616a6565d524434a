//! Devanagari numeral handling.
//!
//! The source site renders every number (years, decision numbers, dates) in
//! Devanagari digits. Stored values always use ASCII digits.

use crate::{Error, Result};

const DEVANAGARI_ZERO: u32 = '०' as u32;

/// Map a single Devanagari digit (`०`..=`९`) to its ASCII counterpart.
fn ascii_digit(c: char) -> Option<char> {
  let offset = (c as u32).checked_sub(DEVANAGARI_ZERO)?;
  if offset < 10 {
    char::from_digit(offset, 10)
  } else {
    None
  }
}

/// Replace every Devanagari digit in `s` with the ASCII digit of the same
/// value. All other characters pass through untouched.
pub fn to_ascii_digits(s: &str) -> String {
  s.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect()
}

/// Collapse whitespace runs into a single space, trim, and convert digits.
///
/// Applied to every value extracted from a page before it is stored.
pub fn normalize_text(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for word in s.split_whitespace() {
    if !out.is_empty() {
      out.push(' ');
    }
    out.push_str(word);
  }
  to_ascii_digits(&out)
}

/// Parse a calendar year written in either digit system (`"२०७३"` or
/// `"2073"`).
pub fn parse_year(s: &str) -> Result<i32> {
  let ascii = to_ascii_digits(s.trim());
  if ascii.is_empty() || !ascii.bytes().all(|b| b.is_ascii_digit()) {
    return Err(Error::MalformedYear(s.to_owned()));
  }
  ascii.parse().map_err(|_| Error::MalformedYear(s.to_owned()))
}
