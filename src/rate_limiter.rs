use std::cell::Cell;
use std::time::{Duration, Instant};

use rand::Rng;

/// Enforces a minimum inter-request interval with jitter.
///
/// One instance lives on the `Scheduler` and is shared across every
/// registered origin — polite crawling is a property of the crawler as a
/// whole, not of any one origin. Jitter is drawn as a fraction of
/// `min_interval` (`uniform(0, jitter * min_interval)`).
///
/// `Cell` is sufficient here because the crawling model is single-threaded
/// and synchronous (§5): a caller needing cross-thread sharing wraps the
/// whole `Scheduler` in a `Mutex`.
pub struct RateLimiter {
    min_interval: Duration,
    jitter: f64,
    last_dispatch: Cell<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, jitter: f64) -> Self {
        RateLimiter {
            min_interval,
            jitter,
            last_dispatch: Cell::new(None),
        }
    }

    /// Block the calling thread until it is polite to issue the next
    /// request.
    pub fn wait_for_slot(&self) {
        let now = Instant::now();
        match self.last_dispatch.get() {
            None => {
                self.last_dispatch.set(Some(now));
            }
            Some(last) => {
                let elapsed = now.duration_since(last);
                if elapsed < self.min_interval {
                    let remaining = self.min_interval - elapsed;
                    let jitter_secs = if self.jitter > 0.0 {
                        let bound = self.jitter * self.min_interval.as_secs_f64();
                        rand::thread_rng().gen_range(0.0..=bound.max(0.0))
                    } else {
                        0.0
                    };
                    std::thread::sleep(remaining + Duration::from_secs_f64(jitter_secs));
                }
                self.last_dispatch.set(Some(Instant::now()));
            }
        }
    }
}
