//! Minimum-interval gate for outbound requests.
//!
//! Both Google and Wikipedia start refusing clients that request too quickly,
//! so every outbound request waits on a [`RateLimiter`] first. The gate is
//! built on `tokio::time`, which lets tests drive it with a paused clock.

use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Guarantees that consecutive [`RateLimiter::acquire`] calls return at least
/// `min_interval` apart.
///
/// The first call never waits.
#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    min_interval: Duration,
    last_release: Option<Instant>,
}

impl RateLimiter {
    pub fn new(name: &'static str, min_interval: Duration) -> Self {
        Self {
            name,
            min_interval,
            last_release: None,
        }
    }

    /// Wait until the interval since the previous release has passed.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_release {
            let ready_at = last + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                debug!(gate = self.name, wait_ms = (ready_at - now).as_millis() as u64, "Throttling");
                sleep_until(ready_at).await;
            }
        }
        self.last_release = Some(Instant::now());
    }
}
