//! Bounded retry with exponential backoff and randomized jitter.

use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

/// Retry policy for flaky external calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff multiplier between attempts
    pub factor: f64,
    /// Delay before the first retry
    pub min_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Scale each delay by a random factor in [1, 2)
    pub randomize: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            factor: 3.0,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            randomize: true,
        }
    }
}

/// Failure after the retry budget ran out
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Attempts actually made
    pub attempts: u32,
    /// Error from the final attempt
    pub last_error: E,
}

impl RetryPolicy {
    /// Policy that retries without sleeping, for tests and dry runs
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            factor: 1.0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            randomize: false,
        }
    }

    /// Delay to wait after the failed attempt number `retry` (0-based)
    pub fn delay_for<R: Rng>(&self, retry: u32, rng: &mut R) -> Duration {
        let jitter: f64 = if self.randomize {
            rng.gen_range(1.0..2.0)
        } else {
            1.0
        };
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = jitter * self.min_delay.as_secs_f64() * self.factor.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());

        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// Run `op` until it succeeds or `max_attempts` is reached.
    ///
    /// `op` receives the 1-based attempt number. Returns the successful value
    /// together with the number of attempts it took.
    pub fn run<T, E, F>(&self, op: F) -> Result<(T, u32), Exhausted<E>>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// Same as [`RetryPolicy::run`] with an injectable sleep function
    pub fn run_with_sleep<T, E, F, S>(&self, mut op: F, mut sleep: S) -> Result<(T, u32), Exhausted<E>>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
        S: FnMut(Duration),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut rng = rand::thread_rng();
        let mut attempt = 1;

        loop {
            info!(attempt, max_attempts, "attempt");
            match op(attempt) {
                Ok(value) => return Ok((value, attempt)),
                Err(e) if attempt >= max_attempts => {
                    warn!(attempt, error = %e, "retry budget exhausted");
                    return Err(Exhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    let delay = self.delay_for(attempt - 1, &mut rng);
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    warn!(attempt, error = %e, delay_ms, "attempt failed, retrying");
                    sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
