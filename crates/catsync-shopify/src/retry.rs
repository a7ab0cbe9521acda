//! Uniform retry policy for every admin API call.
//!
//! [`retry_with_backoff`] wraps one remote call and retries it on transient
//! failures. Validation errors, 4xx responses other than 429, and malformed
//! payloads are returned immediately. A call that creates a record is only
//! replayed after a rate-limit rejection, since a timeout or 5xx may come
//! after the server already stored it.

use std::future::Future;
use std::time::Duration;

use crate::error::AdminError;

/// Upper bound for a single backoff sleep.
const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay: the n-th retry waits `backoff_base_ms * 2^(n-1)` ± 25 %.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Jittered delay before retry number `attempt` (1-based), never shorter
    /// than what the server asked for.
    fn delay_ms(&self, attempt: u32, err: &AdminError) -> u64 {
        let computed = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
        let capped = computed.min(MAX_DELAY_MS);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        match err {
            AdminError::RateLimited { retry_after_ms } => jittered.max(*retry_after_ms),
            _ => jittered,
        }
    }
}

/// Whether repeating a call can change what the server stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Reads, updates, deletes, and upserts.
    Idempotent,
    /// Creates. Only a rejected (429 or `THROTTLED`) attempt is repeated.
    RateLimitOnly,
}

impl Replay {
    pub(crate) fn for_method(method: &reqwest::Method) -> Self {
        if *method == reqwest::Method::POST || *method == reqwest::Method::PATCH {
            Replay::RateLimitOnly
        } else {
            Replay::Idempotent
        }
    }
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:** rate limiting (HTTP 429 or a `THROTTLED` GraphQL error).
/// For [`Replay::Idempotent`] calls also connect and timeout failures, and
/// HTTP 5xx.
///
/// **Not retriable:** any other status, GraphQL errors, and payloads that do
/// not decode.
pub(crate) fn is_retriable(err: &AdminError, replay: Replay) -> bool {
    match err {
        AdminError::RateLimited { .. } => true,
        _ if replay == Replay::RateLimitOnly => false,
        AdminError::Status { status, .. } => *status >= 500,
        AdminError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        AdminError::GraphQl(_)
        | AdminError::Deserialize { .. }
        | AdminError::MissingData { .. }
        | AdminError::InvalidBaseUrl { .. }
        | AdminError::InvalidCredential => false,
    }
}

/// Runs `operation`, retrying transient failures according to `policy`.
///
/// With the default policy (`max_retries = 1`, `backoff_base_ms = 2000`) a
/// rate-limited call is attempted twice, two seconds apart.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    replay: Replay,
    context: &str,
    mut operation: F,
) -> Result<T, AdminError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdminError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err, replay) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = policy.delay_ms(attempt, &err);
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    context,
                    error = %err,
                    "transient admin API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base_ms: 0,
        }
    }

    fn status(status: u16) -> AdminError {
        AdminError::Status {
            method: "GET".to_owned(),
            path: "products.json".to_owned(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn rate_limited_is_retriable() {
        let err = AdminError::RateLimited { retry_after_ms: 0 };
        assert!(is_retriable(&err, Replay::Idempotent));
        assert!(is_retriable(&err, Replay::RateLimitOnly));
    }

    #[test]
    fn server_errors_are_retriable() {
        assert!(is_retriable(&status(502), Replay::Idempotent));
        assert!(!is_retriable(&status(422), Replay::Idempotent));
        assert!(!is_retriable(&status(404), Replay::Idempotent));
    }

    #[test]
    fn creates_are_not_replayed_after_server_errors() {
        assert!(!is_retriable(&status(502), Replay::RateLimitOnly));
        assert!(!is_retriable(&status(503), Replay::RateLimitOnly));
    }

    #[test]
    fn replay_follows_http_method() {
        use reqwest::Method;
        assert_eq!(Replay::for_method(&Method::POST), Replay::RateLimitOnly);
        assert_eq!(Replay::for_method(&Method::GET), Replay::Idempotent);
        assert_eq!(Replay::for_method(&Method::PUT), Replay::Idempotent);
        assert_eq!(Replay::for_method(&Method::DELETE), Replay::Idempotent);
    }

    #[test]
    fn graphql_errors_are_not_retriable() {
        let err = AdminError::GraphQl("bad field".to_owned());
        assert!(!is_retriable(&err, Replay::Idempotent));
    }

    #[test]
    fn delay_honours_retry_after() {
        let p = RetryPolicy {
            max_retries: 1,
            backoff_base_ms: 10,
        };
        let delay = p.delay_ms(1, &AdminError::RateLimited {
            retry_after_ms: 5_000,
        });
        assert_eq!(delay, 5_000);
    }

    #[test]
    fn delay_grows_and_is_capped() {
        let p = RetryPolicy {
            max_retries: 20,
            backoff_base_ms: 1_000,
        };
        let first = p.delay_ms(1, &status(503));
        assert!((750..=1_250).contains(&first), "got {first}");
        let third = p.delay_ms(3, &status(503));
        assert!((3_000..=5_000).contains(&third), "got {third}");
        let huge = p.delay_ms(15, &status(503));
        assert!(huge <= 75_000, "got {huge}");
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), Replay::Idempotent, "test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, AdminError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limit_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(1), Replay::RateLimitOnly, "test", || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AdminError::RateLimited { retry_after_ms: 0 })
                } else {
                    Ok::<u32, AdminError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(2), Replay::Idempotent, "test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(503))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(AdminError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn does_not_retry_validation_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), Replay::Idempotent, "test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(422))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "422 must not be retried");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn create_is_sent_once_on_server_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), Replay::RateLimitOnly, "test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(503))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }
}
