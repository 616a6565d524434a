//! Page fetching with snapshot caching, pacing and bounded retries.
//!
//! [`Transport`] is the seam between the scraper and the network; production
//! uses [`ReqwestTransport`] and tests substitute a scripted fake.

use std::{future::Future, path::PathBuf, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  pacing::RateLimiter,
  snapshot::{SnapshotKey, SnapshotStore},
};

// ─── Transport ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
  pub status: u16,
  pub body:   Vec<u8>,
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
  #[error("request timed out")]
  Timeout,

  #[error("connection failed: {0}")]
  Connect(String),

  #[error("failed to read response body: {0}")]
  Body(String),

  /// The request could not be built at all; retrying cannot help.
  #[error("invalid request: {0}")]
  Invalid(String),
}

impl TransportError {
  pub fn is_transient(&self) -> bool { !matches!(self, Self::Invalid(_)) }
}

/// A single HTTP GET.
pub trait Transport: Send + Sync {
  fn get<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send + 'a;
}

pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new(timeout: Duration, user_agent: &str) -> crate::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(user_agent)
      .build()?;
    Ok(Self { client })
  }
}

impl Transport for ReqwestTransport {
  async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
    let resp = self.client.get(url).send().await.map_err(classify)?;
    let status = resp.status().as_u16();
    let body = resp.bytes().await.map_err(|e| {
      if e.is_timeout() {
        TransportError::Timeout
      } else {
        TransportError::Body(e.to_string())
      }
    })?;
    Ok(HttpResponse { status, body: body.to_vec() })
  }
}

fn classify(e: reqwest::Error) -> TransportError {
  if e.is_timeout() {
    TransportError::Timeout
  } else if e.is_builder() {
    TransportError::Invalid(e.to_string())
  } else {
    TransportError::Connect(e.to_string())
  }
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Attempts per URL, the first included. Never below one.
  pub max_attempts: u32,
  pub delay:        Duration,
}

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("gave up after {attempts} attempts: {reason}")]
  Transient { attempts: u32, reason: String },

  #[error("{0}")]
  Permanent(String),

  /// The snapshot directory failed; the job cannot continue.
  #[error("snapshot store: {0}")]
  Storage(#[source] crate::Error),
}

#[derive(Debug)]
pub struct Fetched {
  pub body:          Vec<u8>,
  pub snapshot_path: PathBuf,
  pub from_cache:    bool,
}

pub struct Fetcher<T> {
  transport: T,
  snapshots: SnapshotStore,
  limiter:   RateLimiter,
  policy:    RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
  pub fn new(
    transport: T,
    snapshots: SnapshotStore,
    limiter: RateLimiter,
    policy: RetryPolicy,
  ) -> Self {
    Self { transport, snapshots, limiter, policy }
  }

  pub fn transport(&self) -> &T { &self.transport }

  pub fn snapshots(&self) -> &SnapshotStore { &self.snapshots }

  /// Fetch `url`, saving the body under `key` before returning it.
  ///
  /// With `prefer_cache`, an existing snapshot is returned without touching
  /// the network.
  pub async fn fetch(
    &self,
    url: &str,
    key: &SnapshotKey,
    prefer_cache: bool,
  ) -> Result<Fetched, FetchError> {
    if prefer_cache {
      match self.snapshots.read(key).await {
        Ok(body) => {
          debug!(url, key = %key.file_name(), "using saved snapshot");
          return Ok(Fetched {
            body,
            snapshot_path: self.snapshots.path(key),
            from_cache: true,
          });
        }
        Err(crate::Error::SnapshotNotFound(_)) => {}
        Err(e) => return Err(FetchError::Storage(e)),
      }
    }

    let body = self.download(url).await?;
    let snapshot_path = self
      .snapshots
      .write(key, &body)
      .await
      .map_err(FetchError::Storage)?;
    Ok(Fetched { body, snapshot_path, from_cache: false })
  }

  async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    let max_attempts = self.policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
      attempt += 1;
      self.limiter.acquire().await;
      debug!(url, attempt, "GET");

      let reason = match self.transport.get(url).await {
        Ok(resp) if (200..300).contains(&resp.status) => {
          if resp.body.is_empty() {
            return Err(FetchError::Permanent(format!(
              "empty response body from {url}"
            )));
          }
          return Ok(resp.body);
        }
        Ok(resp) if is_transient_status(resp.status) => {
          format!("HTTP {}", resp.status)
        }
        Ok(resp) => {
          return Err(FetchError::Permanent(format!("HTTP {}", resp.status)));
        }
        Err(e) if e.is_transient() => e.to_string(),
        Err(e) => return Err(FetchError::Permanent(e.to_string())),
      };

      if attempt >= max_attempts {
        return Err(FetchError::Transient { attempts: attempt, reason });
      }
      warn!(url, attempt, %reason, "fetch failed, retrying");
      tokio::time::sleep(self.policy.delay).await;
    }
  }
}

fn is_transient_status(status: u16) -> bool {
  status == 408 || status == 429 || (500..600).contains(&status)
}
