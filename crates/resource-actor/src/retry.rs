//! # Retry Combinator
//!
//! One retry loop shared by everything that talks to an unreliable dependency. Callers choose
//! how many attempts to make, how long to wait between them and which errors are worth
//! retrying; the loop itself never changes.
//!
//! ```rust
//! use resource_actor::retry::{retry, Backoff, RetryPolicy};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let policy = RetryPolicy::new(3, Backoff::exponential(Duration::from_millis(1)));
//! let mut calls = 0;
//! let outcome = retry(&policy, |e: &&str| *e == "flaky", |_attempt| {
//!     calls += 1;
//!     let result = if calls < 3 { Err("flaky") } else { Ok(calls) };
//!     async move { result }
//! })
//! .await;
//!
//! let done = outcome.unwrap();
//! assert_eq!(done.value, 3);
//! assert_eq!(done.attempts, 3);
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Same delay before every retry.
    Fixed(Duration),
    /// `base × 2^attempt`, where `attempt` is the zero-based index of the attempt that just
    /// failed, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Exponential backoff capped at one minute.
    pub fn exponential(base: Duration) -> Self {
        Backoff::Exponential {
            base,
            max: Duration::from_secs(60),
        }
    }

    /// Delay to wait after the zero-based `failed_attempt`.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(failed_attempt);
                base.saturating_mul(factor).min(*max)
            }
        }
    }
}

/// How often and how patiently to retry.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self::new(1, Backoff::None)
    }

    /// Total sleep between attempts when every attempt fails.
    pub fn worst_case_backoff(&self) -> Duration {
        (0..self.max_attempts.max(1) - 1)
            .map(|failed| self.backoff.delay_after(failed))
            .sum()
    }
}

/// A value (or the final error) together with the number of attempts spent getting it.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects, or the policy runs
/// out of attempts.
///
/// `op` receives the one-based attempt number. On failure the last error is returned along
/// with the number of attempts made.
pub async fn retry<T, E, Op, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut op: Op,
) -> Result<Attempted<T>, Attempted<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => {
                debug!(attempt, "Attempt succeeded");
                return Ok(Attempted {
                    value,
                    attempts: attempt,
                });
            }
            Err(error) if attempt < max_attempts && is_retryable(&error) => {
                let delay = policy.backoff.delay_after(attempt - 1);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                warn!(attempt, max_attempts, %error, "Giving up");
                return Err(Attempted {
                    value: error,
                    attempts: attempt,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum Fault {
        Transient,
        Fatal,
    }

    impl std::fmt::Display for Fault {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Backoff::Fixed(Duration::from_millis(1)))
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_millis(500),
        };
        assert_eq!(backoff.delay_after(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_after(1), Duration::from_millis(200));
        assert_eq!(backoff.delay_after(2), Duration::from_millis(400));
        assert_eq!(backoff.delay_after(3), Duration::from_millis(500));
        assert_eq!(backoff.delay_after(40), Duration::from_millis(500));
    }

    #[test]
    fn worst_case_backoff_sums_the_gaps() {
        let policy = RetryPolicy::new(4, Backoff::exponential(Duration::from_millis(100)));
        assert_eq!(policy.worst_case_backoff(), Duration::from_millis(700));
        assert_eq!(RetryPolicy::once().worst_case_backoff(), Duration::ZERO);
        assert_eq!(
            RetryPolicy::new(0, Backoff::Fixed(Duration::from_secs(1))).worst_case_backoff(),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn stops_after_max_attempts_on_transient_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<Attempted<()>, _> = retry(
            &quick(2),
            |e| *e == Fault::Transient,
            |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(Fault::Transient) }
            },
        )
        .await;

        let failed = result.unwrap_err();
        assert_eq!(failed.value, Fault::Transient);
        assert_eq!(failed.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retryable_error_short_circuits() {
        let result: Result<Attempted<()>, _> = retry(
            &quick(5),
            |e| *e == Fault::Transient,
            |_| async { Err(Fault::Fatal) },
        )
        .await;

        let failed = result.unwrap_err();
        assert_eq!(failed.value, Fault::Fatal);
        assert_eq!(failed.attempts, 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let result = retry(&quick(0), |_: &Fault| true, |n| async move {
            Ok::<u32, Fault>(n)
        })
        .await
        .unwrap();
        assert_eq!(result.value, 1);
        assert_eq!(result.attempts, 1);
    }
}
