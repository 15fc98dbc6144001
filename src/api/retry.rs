//! Retry Policy
//!
//! Re-issues idempotent requests after transient failures.

use std::future::Future;

use super::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly afterwards
    pub backoff_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, backoff_ms: 500 }
    }
}

impl RetryPolicy {
    /// Single attempt, used for non-idempotent requests
    pub fn once() -> Self {
        Self { max_attempts: 1, backoff_ms: 0 }
    }

    pub fn delay_ms(&self, failed_attempt: u32) -> u32 {
        self.backoff_ms.saturating_mul(failed_attempt)
    }
}

/// Run `op` until it succeeds, fails permanently, or attempts run out.
///
/// `op` receives the 1-based attempt number; `sleep` receives the delay in ms.
pub async fn retry<T, Op, Fut, Sleep, SleepFut>(
    policy: &RetryPolicy,
    mut op: Op,
    mut sleep: Sleep,
) -> Result<T, ApiError>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
    Sleep: FnMut(u32) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_ms(attempt);
                log::warn!("[API] attempt {}/{} failed ({}), retrying in {} ms", attempt, max_attempts, err, delay);
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn no_sleep(delays: &RefCell<Vec<u32>>) -> impl FnMut(u32) -> futures::future::Ready<()> + '_ {
        move |ms| {
            delays.borrow_mut().push(ms);
            futures::future::ready(())
        }
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let policy = RetryPolicy { max_attempts: 3, backoff_ms: 100 };
        let delays = RefCell::new(Vec::new());

        let result = retry(
            &policy,
            |attempt| async move {
                if attempt < 3 {
                    Err(ApiError::Network("connection reset".to_string()))
                } else {
                    Ok(attempt)
                }
            },
            no_sleep(&delays),
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(*delays.borrow(), vec![100, 200]);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy { max_attempts: 2, backoff_ms: 10 };
        let delays = RefCell::new(Vec::new());
        let calls = RefCell::new(0);

        let result: Result<(), _> = retry(
            &policy,
            |_| {
                *calls.borrow_mut() += 1;
                async { Err(ApiError::Status { status: 503, body: String::new() }) }
            },
            no_sleep(&delays),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Status { status: 503, .. })));
        assert_eq!(*calls.borrow(), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let delays = RefCell::new(Vec::new());
        let calls = RefCell::new(0);

        let result: Result<(), _> = retry(
            &RetryPolicy::default(),
            |_| {
                *calls.borrow_mut() += 1;
                async { Err(ApiError::Status { status: 404, body: "Task not found".to_string() }) }
            },
            no_sleep(&delays),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(*calls.borrow(), 1);
        assert!(delays.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_once_policy_makes_single_attempt() {
        let delays = RefCell::new(Vec::new());
        let calls = RefCell::new(0);

        let result: Result<(), _> = retry(
            &RetryPolicy::once(),
            |_| {
                *calls.borrow_mut() += 1;
                async { Err(ApiError::Timeout(1000)) }
            },
            no_sleep(&delays),
        )
        .await;

        assert_eq!(result, Err(ApiError::Timeout(1000)));
        assert_eq!(*calls.borrow(), 1);
    }
}
