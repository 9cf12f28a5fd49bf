// src/llm/rate_limit.rs
// Minimum spacing between outbound generation calls

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Spaces call start times at least `60 / rpm` seconds apart.
pub struct RateLimiter {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// `rpm == 0` disables limiting.
    pub fn per_minute(rpm: u32) -> Self {
        let interval = if rpm == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(60.0 / f64::from(rpm))
        };
        info!(rpm, interval_ms = interval.as_millis() as u64, "Rate limiter initialized");
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the interval since the previous call has elapsed, then
    /// record this call.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.interval;
            let now = Instant::now();
            if ready_at > now {
                debug!(sleep_ms = (ready_at - now).as_millis() as u64, "Rate limiting");
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_rpm() {
        assert_eq!(RateLimiter::per_minute(60).interval(), Duration::from_secs(1));
        assert_eq!(RateLimiter::per_minute(0).interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_spaces_consecutive_calls() {
        // 1200 rpm -> 50ms spacing
        let limiter = RateLimiter::per_minute(1200);
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_disabled_limiter_never_waits() {
        let limiter = RateLimiter::per_minute(0);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
