//! Retry + timeout harness wrapped around every structured LLM call.
//!
//! Composition is `with_retry(|| with_timeout(call))`: each attempt gets its own
//! deadline, and a timed-out attempt counts as a failure like any other.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::agents::AnalysisError;

/// Retry policy: up to `max_attempts` additional attempts with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one (1 ⇒ at most 2 tries).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(1000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based): `base * multiplier^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// No retries at all.
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }
}

/// Races `fut` against a hard deadline.
///
/// The losing future is dropped; the underlying HTTP request may still complete
/// server-side, which is acceptable because provider calls are billed externally.
pub async fn with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, AnalysisError>
where
    F: Future<Output = Result<T, AnalysisError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AnalysisError::Timeout {
            operation,
            after: limit,
        }),
    }
}

/// Runs `call` until it succeeds or the policy is exhausted. Returns the last error.
pub async fn with_retry<T, F, Fut>(
    operation: &'static str,
    policy: &RetryPolicy,
    mut call: F,
) -> Result<T, AnalysisError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AnalysisError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "LLM call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_grows_exponentially() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for(0), Duration::from_millis(1000));
        assert_eq!(p.delay_for(1), Duration::from_millis(2000));
        assert_eq!(p.delay_for(2), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_timed_out() {
        let err = with_timeout("analysis agent", Duration::from_secs(120), async {
            tokio::time::sleep(Duration::from_secs(121)).await;
            Ok::<_, AnalysisError>(())
        })
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_beats_timeout() {
        let value = with_timeout("keyword extraction", Duration::from_secs(60), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, AnalysisError>(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_after_one_failure() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = with_retry("feedback agent", &RetryPolicy::default(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(AnalysisError::MalformedOutput {
                        operation: "feedback agent",
                        detail: "missing field".to_string(),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_policy_exhausted() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry("analysis agent", &RetryPolicy::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AnalysisError::MalformedOutput {
                    operation: "analysis agent",
                    detail: "bad json".to_string(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_policy_calls_once() {
        let calls = AtomicU32::new(0);
        let _: Result<(), _> = with_retry("probe", &RetryPolicy::none(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AnalysisError::MalformedOutput {
                    operation: "probe",
                    detail: "x".to_string(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
