//! Error type for `patrika-parse`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The page carried none of the fields the parser extracts; usually an
  /// error page or a changed layout.
  #[error("no case fields found in {url}")]
  NoContent { url: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
