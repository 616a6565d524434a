//! Error type for `patrika-scrape`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] patrika_core::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("http client error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid url: {0}")]
  Url(#[from] url::ParseError),

  #[error("no snapshot at {0}")]
  SnapshotNotFound(PathBuf),

  #[error("{0} exists and is not a directory")]
  NotADirectory(PathBuf),

  /// `--test-link` on a URL the store has never seen, without
  /// `--case-type`/`--year`.
  #[error("case type and year of {0} are unknown; pass --case-type and --year")]
  UnknownOrigin(String),

  /// Persistence failures abort the job.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
