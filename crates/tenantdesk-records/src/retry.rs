//! Retry with exponential back-off and jitter for record service reads.
//!
//! Only list calls go through [`retry_with_backoff`]. Creates and edits are
//! sent once: repeating a mutation the server may already have applied
//! would duplicate the record.

use std::future::Future;
use std::time::Duration;

use crate::error::RecordsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx.
///
/// **Not retriable:** envelope-level [`RecordsError::Api`] failures, bodies
/// that fail to deserialize, 4xx responses, and a bad base URL.
pub(crate) fn is_retriable(err: &RecordsError) -> bool {
    match err {
        RecordsError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        RecordsError::Api { .. }
        | RecordsError::Deserialize { .. }
        | RecordsError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt     |
/// |---------|-------------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter     |
/// | 2       | 500 ms × 2¹ ± 25 % jitter     |
/// | 3       | 500 ms × 2² ± 25 % jitter     |
///
/// Delay is capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    operation_name: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, RecordsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RecordsError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "record service transient error; retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
