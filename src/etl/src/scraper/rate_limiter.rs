//! Politeness delay between requests to one host.

use std::cell::Cell;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::debug;

/// Blocks until a jittered delay has passed since the previous request
pub struct RateLimiter {
    last_request: Cell<Option<Instant>>,
    min_delay: Duration,
    max_delay: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `min_delay_secs` - Minimum delay between requests
    /// * `max_delay_secs` - Maximum delay between requests
    pub fn new(min_delay_secs: f64, max_delay_secs: f64) -> Self {
        let min_delay = Duration::from_secs_f64(min_delay_secs.max(0.0));
        let max_delay = Duration::from_secs_f64(max_delay_secs.max(0.0)).max(min_delay);
        Self {
            last_request: Cell::new(None),
            min_delay,
            max_delay,
        }
    }

    /// No delay at all
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Wait for our turn, then mark the request as sent
    pub fn acquire(&self) {
        if let Some(last) = self.last_request.get() {
            let range = self.max_delay - self.min_delay;
            let target = self.min_delay + range.mul_f64(rand_delay());
            let elapsed = last.elapsed();
            if elapsed < target {
                let wait = target - elapsed;
                debug!("Rate limiter waiting {:?}", wait);
                sleep(wait);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

/// Generate a pseudo-random delay factor (0.0 - 1.0)
fn rand_delay() -> f64 {
    use std::time::SystemTime;
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| (d.subsec_nanos() % 1000) as f64 / 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_acquire_does_not_wait() {
        let limiter = RateLimiter::new(5.0, 5.0);
        let start = Instant::now();
        limiter.acquire();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_enforces_min_delay() {
        let limiter = RateLimiter::new(0.05, 0.05);
        limiter.acquire();
        let start = Instant::now();
        limiter.acquire();
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_disabled_never_waits() {
        let limiter = RateLimiter::disabled();
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_rand_delay_range() {
        for _ in 0..20 {
            let factor = rand_delay();
            assert!((0.0..1.0).contains(&factor));
        }
    }
}
