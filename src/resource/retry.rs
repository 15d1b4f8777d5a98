//! resource::retry
//!
//! Bounded-duration retry for conditional pushes.
//!
//! A push loses its compare-and-swap race when another client moves the
//! branch between head resolution and submission. The attempt closure
//! re-resolves the head each time, so a retry rebuilds the push on the new
//! head. Only errors the caller marks retryable are attempted again; the
//! loop sleeps with capped exponential backoff and gives up at the deadline
//! with the last error it saw.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::error::ResourceError;
use crate::core::config::{
    Config, DEFAULT_CREATE_TIMEOUT, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF,
};

/// How long to keep retrying, and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Deadline for the whole loop, measured from the first attempt.
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Policy with the given deadline and default backoff.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    /// Policy for mutating operations from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.create_timeout())
            .with_backoff(config.initial_backoff(), config.max_backoff())
    }

    /// Sleep before the attempt following `failures` failed ones.
    fn backoff(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CREATE_TIMEOUT)
    }
}

/// Outcome of a failed attempt.
#[derive(Debug)]
pub enum RetryError {
    /// Worth another attempt (a lost compare-and-swap race).
    Retryable(ResourceError),
    /// Stop immediately and surface this error.
    NonRetryable(ResourceError),
}

/// Run `attempt` until it succeeds, fails non-retryably, or the policy's
/// deadline passes.
///
/// # Errors
///
/// - the error of a non-retryable failure, unchanged
/// - `RetryTimeout` wrapping the last retryable error once the deadline
///   passes
/// - `Timeout` if the very first attempt is still running at the deadline
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut attempt: F,
) -> Result<T, ResourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError>>,
{
    let start = Instant::now();
    let deadline = deadline_after(start, policy.timeout);
    let mut failures = 0u32;
    let mut last: Option<ResourceError> = None;

    loop {
        let outcome = match tokio::time::timeout_at(deadline, attempt()).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(gave_up(operation, policy, start, last)),
        };

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(err)) => return Err(err),
            Err(RetryError::Retryable(err)) => err,
        };
        failures += 1;

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(gave_up(operation, policy, start, Some(err)));
        }
        let wait = policy.backoff(failures).min(remaining);
        debug!(operation, failures, ?wait, error = %err, "retrying");
        last = Some(err);
        tokio::time::sleep(wait).await;
    }
}

/// `start + after`, or roughly thirty years out if that overflows.
fn deadline_after(start: Instant, after: Duration) -> Instant {
    start
        .checked_add(after)
        .unwrap_or_else(|| start + Duration::from_secs(86_400 * 365 * 30))
}

fn gave_up(
    operation: &str,
    policy: &RetryPolicy,
    start: Instant,
    last: Option<ResourceError>,
) -> ResourceError {
    match last {
        Some(last) => ResourceError::RetryTimeout {
            elapsed: start.elapsed(),
            last: Box::new(last),
        },
        None => ResourceError::Timeout {
            operation: operation.to_string(),
            after: policy.timeout,
        },
    }
}

/// Bound a single operation by `after`.
///
/// # Errors
///
/// Returns `Timeout` if `fut` has not finished in time, else its own result.
pub async fn with_deadline<T, Fut>(
    after: Duration,
    operation: &str,
    fut: Fut,
) -> Result<T, ResourceError>
where
    Fut: Future<Output = Result<T, ResourceError>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| ResourceError::Timeout {
            operation: operation.to_string(),
            after,
        })?
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::azdo::AzdoError;

    fn fast(timeout_ms: u64) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(timeout_ms))
            .with_backoff(Duration::from_millis(1), Duration::from_millis(5))
    }

    fn conflict() -> ResourceError {
        ResourceError::Api(AzdoError::ApiError {
            status: 409,
            message: "has already been updated by another client".into(),
            type_key: None,
        })
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::new(Duration::from_secs(60))
            .with_backoff(Duration::from_millis(500), Duration::from_secs(3));
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
        assert_eq!(policy.backoff(4), Duration::from_secs(3));
        assert_eq!(policy.backoff(40), Duration::from_secs(3));
    }

    #[test]
    fn max_backoff_never_below_initial() {
        let policy = RetryPolicy::default()
            .with_backoff(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(policy.max_backoff, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn succeeds_after_retryable_failures() {
        let calls = &AtomicU32::new(0);
        let result = retry(&fast(2_000), "push", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(RetryError::Retryable(conflict()))
            } else {
                Ok("pushed")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "pushed");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_stops_immediately() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry(&fast(2_000), "push", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RetryError::NonRetryable(ResourceError::EmptyBranch {
                branch: "main".into(),
            }))
        })
        .await;

        assert!(matches!(result, Err(ResourceError::EmptyBranch { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deadline_surfaces_last_error() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry(&fast(50), "push", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RetryError::Retryable(conflict()))
        })
        .await;

        let err = result.unwrap_err();
        assert!(calls.load(Ordering::SeqCst) > 1);
        match &err {
            ResourceError::RetryTimeout { last, .. } => {
                assert!(last.to_string().contains("already been updated"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.api_error().is_some_and(AzdoError::is_stale_ref));
    }

    #[tokio::test]
    async fn slow_first_attempt_times_out() {
        let result: Result<(), _> = retry(&fast(20), "push", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ResourceError::Timeout { .. })));
    }

    #[test]
    fn huge_timeout_does_not_overflow() {
        let start = Instant::now();
        assert!(deadline_after(start, Duration::MAX) > start);
        assert_eq!(
            deadline_after(start, Duration::from_secs(5)),
            start + Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn huge_timeout_still_retries() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(Duration::from_secs(u64::MAX))
            .with_backoff(Duration::from_millis(1), Duration::from_millis(1));
        let result = retry(&policy, "push", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(RetryError::Retryable(conflict()))
            } else {
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn with_deadline_passes_result_through() {
        let value = with_deadline(Duration::from_secs(1), "read", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = with_deadline(Duration::from_millis(10), "read", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "read did not finish within 10ms");
    }
}
