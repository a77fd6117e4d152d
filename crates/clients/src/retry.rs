// Path: crates/clients/src/retry.rs
//! Shared retry/backoff policy for RPC calls against the source ledger,
//! the target chain and the consensus endpoint.
//!
//! Backoff schedule: 1, 2, 4, 8, 16 seconds, five attempts total.

use std::time::Duration;

use tokio::time::sleep;

/// Number of attempts a retryable call gets before giving up.
pub const MAX_ATTEMPTS: usize = 5;

/// Backoff delay before attempt `attempt` (0-indexed, so `attempt` is the
/// number of attempts already made).
pub fn backoff_delay(attempt: usize) -> Duration {
    let secs = 1u64 << attempt.min(4);
    Duration::from_secs(secs)
}

/// Runs `f` up to [`MAX_ATTEMPTS`] times, sleeping [`backoff_delay`] between
/// attempts, and returns the last error if every attempt is exhausted.
pub async fn with_retry<T, E, F, Fut>(op_name: &str, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    tracing::warn!(target = "certen_clients", op = op_name, attempts = attempt, error = %e, "retries exhausted");
                    return Err(e);
                }
                let delay = backoff_delay(attempt - 1);
                tracing::debug!(target = "certen_clients", op = op_name, attempt, ?delay, error = %e, "retrying after error");
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_matches_spec() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
        assert_eq!(backoff_delay(4), Duration::from_secs(16));
        assert_eq!(backoff_delay(10), Duration::from_secs(16));
    }

    #[tokio::test]
    async fn with_retry_returns_first_success() {
        let out: Result<u32, &str> = with_retry("noop", || async { Ok(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn with_retry_exhausts_and_returns_last_error() {
        let mut calls = 0;
        let out: Result<u32, &str> = with_retry("always_fails", || {
            calls += 1;
            async { Err("nope") }
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls, MAX_ATTEMPTS);
    }
}
