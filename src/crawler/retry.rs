//! Exponential backoff for transient fetch failures

use crate::FetchError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Executes `operation`, retrying transient failures with exponential backoff
///
/// A failure is retried when [`FetchError::is_retriable`] holds (transport
/// errors and 5xx responses). The wait before retry `n` (counting from zero)
/// is `backoff_base * 2^n`. With `max_retries = 3` the operation runs at most
/// four times; the last error is returned once retries are exhausted.
///
/// | Attempt | Sleep before it (base = 1s) |
/// |---------|-----------------------------|
/// | 0 | none |
/// | 1 | 1s |
/// | 2 | 2s |
/// | 3 | 4s |
///
/// Cancellation is checked before each retry and interrupts the backoff
/// sleep. Either way the failure that triggered the retry is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base: Duration,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retriable() || attempt >= max_retries || cancel.is_cancelled() {
            return Err(err);
        }

        let delay = backoff_base.saturating_mul(1u32 << attempt.min(16));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient fetch failure, retrying after backoff"
        );
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => {
                tracing::debug!(attempt, error = %err, "Retry abandoned: run cancelled");
                return Err(err);
            }
        }
        attempt += 1;
    }
}
