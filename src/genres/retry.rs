//! Bounded retry for lookup calls.
//!
//! Rate-limit responses wait for the server-provided delay, server errors wait
//! a fixed backoff, everything else fails immediately.

use super::lookup::LookupError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after a rate-limit response without a usable `retry-after`.
    pub default_rate_limit_wait: Duration,
    /// Wait after a 5xx response.
    pub server_error_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            default_rate_limit_wait: Duration::from_secs(5),
            server_error_wait: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Progress of one call through the retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// 1-based number of the attempt about to run (or that just failed).
    pub attempt: u32,
    /// Delay scheduled before the next attempt, if any.
    pub next_delay: Option<Duration>,
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            attempt: 1,
            next_delay: None,
        }
    }

    /// Transition after a failed attempt.
    pub fn on_failure(&mut self, policy: &RetryPolicy, error: &LookupError) -> RetryDecision {
        if !error.is_transient() || self.attempt >= policy.max_attempts {
            self.next_delay = None;
            return RetryDecision::GiveUp;
        }

        let delay = match error {
            LookupError::RateLimited { retry_after } => {
                retry_after.unwrap_or(policy.default_rate_limit_wait)
            }
            _ => policy.server_error_wait,
        };
        self.attempt += 1;
        self.next_delay = Some(delay);
        RetryDecision::RetryAfter(delay)
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds or the policy gives up, returning the
    /// last error in the latter case.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, LookupError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LookupError>>,
    {
        let mut state = RetryState::new();
        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match state.on_failure(self, &error) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        "{}: {}, retrying in {:?} (attempt {}/{})",
                        label, error, delay, state.attempt, self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => {
                    debug!("{}: giving up after attempt {}: {}", label, state.attempt, error);
                    return Err(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            default_rate_limit_wait: Duration::from_millis(1),
            server_error_wait: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.default_rate_limit_wait, Duration::from_secs(5));
        assert_eq!(policy.server_error_wait, Duration::from_secs(5));
    }

    #[test]
    fn test_rate_limit_uses_retry_after() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::new();

        let decision = state.on_failure(
            &policy,
            &LookupError::RateLimited {
                retry_after: Some(Duration::from_secs(2)),
            },
        );
        assert_eq!(decision, RetryDecision::RetryAfter(Duration::from_secs(2)));
        assert_eq!(state.attempt, 2);
        assert_eq!(state.next_delay, Some(Duration::from_secs(2)));

        let decision = state.on_failure(&policy, &LookupError::RateLimited { retry_after: None });
        assert_eq!(decision, RetryDecision::RetryAfter(Duration::from_secs(5)));
    }

    #[test]
    fn test_server_error_uses_fixed_backoff() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::new();
        let decision = state.on_failure(&policy, &LookupError::Server { status: 503 });
        assert_eq!(decision, RetryDecision::RetryAfter(Duration::from_secs(5)));
    }

    #[test]
    fn test_other_errors_give_up_immediately() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::new();
        let decision = state.on_failure(
            &policy,
            &LookupError::Rejected {
                status: 400,
                body: "bad".to_string(),
            },
        );
        assert_eq!(decision, RetryDecision::GiveUp);
        assert_eq!(state.attempt, 1);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::new();
        let error = LookupError::Server { status: 500 };

        for _ in 0..4 {
            assert!(matches!(
                state.on_failure(&policy, &error),
                RetryDecision::RetryAfter(_)
            ));
        }
        assert_eq!(state.attempt, 5);
        assert_eq!(state.on_failure(&policy, &error), RetryDecision::GiveUp);
    }

    #[tokio::test]
    async fn test_run_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = fast_policy()
            .run("test", || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(LookupError::Server { status: 502 })
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_at_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = fast_policy()
            .run("test", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LookupError::RateLimited { retry_after: None })
                }
            })
            .await;

        assert!(matches!(result, Err(LookupError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_rejections() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = fast_policy()
            .run("test", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LookupError::Rejected {
                        status: 404,
                        body: String::new(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
