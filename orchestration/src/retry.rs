//! Bounded retries with a per-attempt timeout for collaborator calls.
//!
//! Each attempt is wrapped in `tokio::time::timeout`. Transient failures back
//! off exponentially (`backoff_ms`, then 2x, 4x, ...); non-retriable errors
//! fail immediately.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{Collaborator, CollaboratorError, DebateError, DebateResult};

/// Retry budget for one collaborator call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Timeout applied to every attempt.
    pub timeout_ms: u64,
    /// Delay before the second attempt; doubled for each one after.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_ms: 60_000,
            backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// A single attempt with no backoff.
    pub fn once(timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            backoff_ms: 0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be > 0".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be > 0".to_string());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay after the given failed attempt (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Run `call` under `policy`, mapping the final failure to
/// [`DebateError::CollaboratorFailure`].
pub async fn invoke<T, F, Fut>(
    collaborator: Collaborator,
    policy: &RetryPolicy,
    mut call: F,
) -> DebateResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let timeout = policy.timeout();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match tokio::time::timeout(timeout, call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => CollaboratorError::Timeout(timeout),
        };

        if !err.is_retriable() || attempt >= max_attempts {
            return Err(DebateError::CollaboratorFailure {
                collaborator,
                attempts: attempt,
                source: err,
            });
        }

        let backoff = policy.backoff_after(attempt);
        warn!(
            %collaborator,
            attempt,
            max_attempts,
            backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Collaborator call failed, retrying"
        );
        tokio::time::sleep(backoff).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            timeout_ms: 1_000,
            backoff_ms: 10,
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = fast_policy(4);
        assert_eq!(policy.backoff_after(1), Duration::from_millis(10));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(20));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(40));
    }

    #[test]
    fn test_once_saturates_huge_timeouts() {
        let policy = RetryPolicy::once(Duration::MAX);
        assert_eq!(policy.timeout_ms, u64::MAX);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(RetryPolicy::once(Duration::from_secs(2)).timeout_ms, 2_000);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        assert!(fast_policy(0).validate().is_err());
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_then_success() {
        let calls = AtomicU32::new(0);
        let result = invoke(Collaborator::Writer, &fast_policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(CollaboratorError::RateLimited("429".into()))
                } else {
                    Ok("draft".to_string())
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, "draft");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_report_attempts() {
        let calls = AtomicU32::new(0);
        let err = invoke(Collaborator::Verifier, &fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<String, _>(CollaboratorError::Inference("503".into())) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            DebateError::CollaboratorFailure {
                collaborator,
                attempts,
                ..
            } => {
                assert_eq!(collaborator, Collaborator::Verifier);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_is_not_retried() {
        let calls = AtomicU32::new(0);
        let err = invoke(Collaborator::Summarizer, &fast_policy(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<String, _>(CollaboratorError::Unavailable("no key".into())) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            err,
            DebateError::CollaboratorFailure { attempts: 1, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let policy = RetryPolicy::once(Duration::from_secs(5));
        let err = invoke(Collaborator::Writer, &policy, || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, CollaboratorError>("late".to_string())
        })
        .await
        .unwrap_err();
        match err {
            DebateError::CollaboratorFailure { source, .. } => {
                assert_eq!(source, CollaboratorError::Timeout(Duration::from_secs(5)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
