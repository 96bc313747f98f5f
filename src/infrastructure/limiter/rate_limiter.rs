use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use parking_lot::Mutex;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Accepted hits of one client inside the trailing window.
#[derive(Debug)]
struct SlidingWindow {
    hits: VecDeque<Instant>,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(now: Instant) -> Self {
        Self { hits: VecDeque::new(), last_seen: now }
    }

    fn check(&mut self, now: Instant, window: Duration, limit: u64) -> RateDecision {
        self.last_seen = now;
        while let Some(oldest) = self.hits.front() {
            if now.duration_since(*oldest) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }

        if (self.hits.len() as u64) < limit {
            self.hits.push_back(now);
            return RateDecision::Allowed;
        }

        // Full window: the next slot frees up when the oldest hit expires.
        let retry_after = self
            .hits
            .front()
            .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(window);
        RateDecision::Limited { retry_after }
    }
}

/// Per-key sliding window limiter shared across workers.
#[derive(Clone)]
pub struct SubmissionLimiter {
    map: Arc<DashMap<String, Arc<Mutex<SlidingWindow>>>>,
    window: Duration,
    limit: u64,
}

impl SubmissionLimiter {
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window,
            limit,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(now))))
            .clone()
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.get_window(key, now);
        let mut window = window.lock();
        window.check(now, self.window, self.limit)
    }

    /// Drops keys that have been quiet for longer than `ttl`. Returns how many
    /// were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(ttl, Instant::now())
    }

    pub fn evict_idle_at(&self, ttl: Duration, now: Instant) -> usize {
        let before = self.map.len();
        self.map
            .retain(|_, window| now.saturating_duration_since(window.lock().last_seen) <= ttl);
        before.saturating_sub(self.map.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_within_window_and_recovers() {
        let limiter = SubmissionLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert_eq!(limiter.check_at("1.2.3.4", start), RateDecision::Allowed);
        assert_eq!(
            limiter.check_at("1.2.3.4", start + Duration::from_secs(10)),
            RateDecision::Allowed
        );
        assert_eq!(
            limiter.check_at("1.2.3.4", start + Duration::from_secs(20)),
            RateDecision::Limited { retry_after: Duration::from_secs(40) }
        );

        // Other clients are unaffected.
        assert!(matches!(limiter.check_at("5.6.7.8", start), RateDecision::Allowed));

        // First hit has expired.
        assert!(matches!(
            limiter.check_at("1.2.3.4", start + Duration::from_secs(61)),
            RateDecision::Allowed
        ));
    }

    #[test]
    fn rejected_hits_do_not_extend_the_window() {
        let limiter = SubmissionLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();
        limiter.check_at("k", start);
        for s in 1..10 {
            assert!(matches!(
                limiter.check_at("k", start + Duration::from_secs(s)),
                RateDecision::Limited { .. }
            ));
        }
        assert!(matches!(
            limiter.check_at("k", start + Duration::from_secs(10)),
            RateDecision::Allowed
        ));
    }

    #[test]
    fn idle_keys_are_evicted() {
        let limiter = SubmissionLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();
        limiter.check_at("old", start);
        limiter.check_at("fresh", start + Duration::from_secs(100));

        let removed = limiter.evict_idle_at(Duration::from_secs(60), start + Duration::from_secs(120));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
