use tokio::time::{interval, Duration};

use crate::limiter::SubmissionLimiter;

/// Drops rate limiter entries that have been idle for a full window.
pub async fn start_limiter_eviction_task(limiter: SubmissionLimiter) {
    let window = limiter.window();
    let mut interval = interval(window.min(Duration::from_secs(10 * 60)));

    loop {
        interval.tick().await;

        let evicted = limiter.evict_idle(window);
        if evicted > 0 {
            tracing::debug!(evicted, remaining = limiter.tracked_keys(), "Evicted idle rate limit entries");
        }
    }
}
