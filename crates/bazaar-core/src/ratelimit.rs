//! Per-user token-bucket rate limiter, checked by the transport router
//! before an event reaches the session engine.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::domain::UserId;

#[derive(Clone, Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

#[derive(Clone, Debug)]
pub struct RateLimiter {
    enabled: bool,
    capacity: f64,
    refill_per_sec: f64,
    buckets: HashMap<UserId, Bucket>,
}

/// Outcome of a rate-limit check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RateDecision {
    Allow,
    /// Denied; the user may retry after roughly this long.
    Deny(Duration),
}

impl RateLimiter {
    pub fn new(enabled: bool, requests: u32, window: Duration) -> Self {
        let capacity = f64::from(requests.max(1));
        Self {
            enabled,
            capacity,
            refill_per_sec: capacity / window.as_secs_f64().max(1e-9),
            buckets: HashMap::new(),
        }
    }

    pub fn check(&mut self, user: UserId) -> RateDecision {
        self.check_at(user, Instant::now())
    }

    pub fn check_at(&mut self, user: UserId, now: Instant) -> RateDecision {
        if !self.enabled {
            return RateDecision::Allow;
        }

        let bucket = self.buckets.entry(user).or_insert(Bucket {
            tokens: self.capacity,
            refilled_at: now,
        });

        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return RateDecision::Allow;
        }

        let wait = (1.0 - bucket.tokens) / self.refill_per_sec;
        RateDecision::Deny(Duration::from_secs_f64(wait.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_capped_then_refills() {
        let mut rl = RateLimiter::new(true, 2, Duration::from_secs(2));
        let t0 = Instant::now();

        assert_eq!(rl.check_at(UserId(1), t0), RateDecision::Allow);
        assert_eq!(rl.check_at(UserId(1), t0), RateDecision::Allow);
        assert!(matches!(rl.check_at(UserId(1), t0), RateDecision::Deny(_)));

        // One token refills after one second at 2 tokens / 2 s.
        let later = t0 + Duration::from_millis(1100);
        assert_eq!(rl.check_at(UserId(1), later), RateDecision::Allow);
    }

    #[test]
    fn users_have_independent_buckets() {
        let mut rl = RateLimiter::new(true, 1, Duration::from_secs(60));
        let t0 = Instant::now();

        assert_eq!(rl.check_at(UserId(1), t0), RateDecision::Allow);
        assert!(matches!(rl.check_at(UserId(1), t0), RateDecision::Deny(_)));
        assert_eq!(rl.check_at(UserId(2), t0), RateDecision::Allow);
    }

    #[test]
    fn disabled_limiter_always_allows() {
        let mut rl = RateLimiter::new(false, 1, Duration::from_secs(60));
        let t0 = Instant::now();
        for _ in 0..10 {
            assert_eq!(rl.check_at(UserId(1), t0), RateDecision::Allow);
        }
    }
}
