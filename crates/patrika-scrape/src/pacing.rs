//! Request pacing shared by every job in the process.

use std::time::Duration;

use tokio::{
  sync::Mutex,
  time::{Instant, sleep_until},
};

/// Keeps consecutive network requests at least `interval` apart.
///
/// Waiters queue on the lock, so concurrent jobs are spaced against each
/// other and not only within themselves.
#[derive(Debug)]
pub struct RateLimiter {
  interval: Duration,
  next:     Mutex<Option<Instant>>,
}

impl RateLimiter {
  pub fn new(interval: Duration) -> Self {
    Self { interval, next: Mutex::new(None) }
  }

  pub fn interval(&self) -> Duration { self.interval }

  /// Wait until a request may be sent, then claim the slot.
  pub async fn acquire(&self) {
    let mut next = self.next.lock().await;
    if let Some(at) = *next {
      sleep_until(at).await;
    }
    *next = Some(Instant::now() + self.interval);
  }
}
