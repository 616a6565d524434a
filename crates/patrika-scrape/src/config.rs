//! Scraper configuration.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, then
//! `PATRIKA_*` environment variables. Command-line flags are applied on top
//! by the binary.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

use crate::{Result, fetch::RetryPolicy};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
  pub store_path:           PathBuf,
  pub snapshot_dir:         PathBuf,
  pub base_url:             String,
  pub request_timeout_secs: u64,
  /// Network attempts per URL, the first included.
  pub max_attempts:         u32,
  pub retry_delay_secs:     u64,
  /// Minimum spacing between consecutive network requests.
  pub pacing_secs:          u64,
  pub user_agent:           String,
}

impl Default for ScrapeConfig {
  fn default() -> Self {
    Self {
      store_path:           PathBuf::from("legal_cases.db"),
      snapshot_dir:         PathBuf::from("scraped_html"),
      base_url:             "https://nkp.gov.np/".to_string(),
      request_timeout_secs: 30,
      max_attempts:         3,
      retry_delay_secs:     2,
      pacing_secs:          2,
      user_agent:
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
          .to_string(),
    }
  }
}

impl ScrapeConfig {
  /// Load from `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PATRIKA"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn pacing(&self) -> Duration { Duration::from_secs(self.pacing_secs) }

  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      max_attempts: self.max_attempts.max(1),
      delay:        Duration::from_secs(self.retry_delay_secs),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
