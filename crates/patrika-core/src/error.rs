//! Error types for `patrika-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown case type: {0:?}")]
  UnknownCaseType(String),

  #[error("malformed year: {0:?}")]
  MalformedYear(String),

  #[error("no page layout covers year {0}")]
  UnsupportedYear(i32),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
