use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Sliding-window admission control for a quota-limited external service.
///
/// Keeps a time-ordered log of recent admissions; `admit` suspends the
/// caller until one more call fits inside the trailing window. Bursts up
/// to `max_calls` pass back-to-back, after which sustained load is
/// throttled to roughly one admission per `window / max_calls`.
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    admissions: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            admissions: Mutex::new(VecDeque::new()),
        }
    }

    /// Limit to `max_calls` per trailing minute.
    pub fn per_minute(max_calls: usize) -> Self {
        Self::new(max_calls, Duration::from_secs(60))
    }

    /// Block until issuing one more call stays within the window, then
    /// record the admission. The log is held for the whole check-and-record
    /// step, so concurrent callers are admitted one at a time.
    pub async fn admit(&self) {
        let mut admissions = self.admissions.lock().await;

        let now = Instant::now();
        while let Some(&oldest) = admissions.front() {
            if now.duration_since(oldest) >= self.window {
                admissions.pop_front();
            } else {
                break;
            }
        }

        if admissions.len() >= self.max_calls {
            if let Some(&oldest) = admissions.front() {
                let elapsed = now.duration_since(oldest);
                if elapsed < self.window {
                    let wait = self.window - elapsed;
                    debug!("Rate limit reached, waiting {:?}", wait);
                    sleep(wait).await;
                }
                admissions.pop_front();
            }
        }

        admissions.push_back(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_within_limit_is_not_delayed() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let started = Instant::now();

        for _ in 0..3 {
            limiter.admit().await;
        }

        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_beyond_limit_waits_for_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let started = Instant::now();

        for _ in 0..3 {
            limiter.admit().await;
        }
        limiter.admit().await;

        assert!(started.elapsed() >= Duration::from_secs(59));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_pruned() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        limiter.admit().await;
        limiter.admit().await;
        tokio::time::advance(Duration::from_secs(61)).await;

        let started = Instant::now();
        limiter.admit().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_admissions_are_serialized() {
        use std::sync::Arc;

        let limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(60)));
        let started = Instant::now();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..3 {
            let limiter = Arc::clone(&limiter);
            tasks.spawn(async move { limiter.admit().await });
        }
        while tasks.join_next().await.is_some() {}

        // Third admission must have waited out the full window.
        assert!(started.elapsed() >= Duration::from_secs(59));
    }
}
