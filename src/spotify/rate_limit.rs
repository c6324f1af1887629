use std::{
    fmt::Display,
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
    thread,
    time::{Duration, Instant},
};

use rand::Rng;

/// Pacing and retry settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Minimum spacing between two request starts.
    pub min_interval: Duration,
    /// First backoff delay; doubled on every further attempt.
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
    /// Add up to ±10% random jitter to every backoff delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            // roughly three requests per second
            min_interval: Duration::from_millis(334),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_retries: 5,
            jitter: true,
        }
    }
}

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { retry_after: Option<Duration> },
    GiveUp,
}

/// Process-wide request scheduler.
///
/// Requests run one at a time under a [`Permit`]; acquiring waits until the
/// policy's minimum interval since the previous acquisition has passed.
pub struct RateLimiter {
    policy: RetryPolicy,
    last_start: Mutex<Option<Instant>>,
}

/// Exclusive right to send one request. Released on drop.
pub struct Permit<'a> {
    _slot: MutexGuard<'a, Option<Instant>>,
}

static SHARED: LazyLock<Arc<RateLimiter>> =
    LazyLock::new(|| Arc::new(RateLimiter::new(RetryPolicy::default())));

impl RateLimiter {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            last_start: Mutex::new(None),
        }
    }

    /// The limiter every gateway in this process should share.
    pub fn shared() -> Arc<RateLimiter> {
        Arc::clone(&SHARED)
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn acquire(&self) -> Permit<'_> {
        let mut slot = self
            .last_start
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = *slot {
            let elapsed = last.elapsed();
            if elapsed < self.policy.min_interval {
                let wait = self.policy.min_interval - elapsed;
                log::trace!("throttling request for {:?}", wait);
                thread::sleep(wait);
            }
        }

        *slot = Some(Instant::now());
        Permit { _slot: slot }
    }

    /// Delay before retry number `attempt + 1`.
    ///
    /// A server-provided `retry_after` replaces the exponential delay. Both
    /// are capped at `max_delay` before jitter is applied.
    pub fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(after) => after,
            None => self
                .policy
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        let delay = delay.min(self.policy.max_delay).as_secs_f64();

        let jitter_range = delay * 0.1;
        let delay = if self.policy.jitter && jitter_range > 0.0 {
            delay + rand::rng().random_range(-jitter_range..=jitter_range)
        } else {
            delay
        };

        Duration::from_secs_f64(delay.max(0.0))
    }

    /// Runs `call` under a permit, retrying while `classify` says so and the
    /// retry budget lasts. Backoff sleeps happen without holding a permit.
    pub fn execute<T, E, F, C>(&self, mut call: F, classify: C) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
        C: Fn(&E) -> RetryDecision,
    {
        let mut attempt: u32 = 0;

        loop {
            let result = {
                let _permit = self.acquire();
                call()
            };

            let err = match result {
                Ok(value) => {
                    if attempt > 0 {
                        log::info!("request succeeded after {} retries", attempt);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            match classify(&err) {
                RetryDecision::Retry { retry_after } if attempt < self.policy.max_retries => {
                    let delay = self.backoff_delay(attempt, retry_after);
                    log::warn!(
                        "{} - retrying in {:.2}s (attempt {}/{})",
                        err,
                        delay.as_secs_f64(),
                        attempt + 1,
                        self.policy.max_retries
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                RetryDecision::Retry { .. } => {
                    log::error!("request failed after {} retries: {}", attempt, err);
                    return Err(err);
                }
                RetryDecision::GiveUp => return Err(err),
            }
        }
    }
}
