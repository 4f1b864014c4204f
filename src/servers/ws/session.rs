//! Per-session state for the WebSocket tracker.
use std::time::Instant;

/// Token-bucket limiter for the announce rate of one session.
///
/// Tokens refill at the sustained rate up to the burst capacity; every
/// announce costs one token. The bucket starts full so a freshly connected
/// client can announce its whole torrent list at once.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    tokens: f64,
    refill_per_second: f64,
    last_refill: Instant,
}

impl RateLimiter {
    #[must_use]
    pub fn new(burst: u32, per_second: u32) -> Self {
        Self {
            capacity: f64::from(burst.max(1)),
            tokens: f64::from(burst.max(1)),
            refill_per_second: f64::from(per_second.max(1)),
            last_refill: Instant::now(),
        }
    }

    /// Spends one token if available.
    pub fn allow(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);

        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_per_second).min(self.capacity);
        self.last_refill = now;
    }
}
