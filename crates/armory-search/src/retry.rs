//! Retry with exponential backoff and jitter for transient index errors.
//!
//! Retriable: 429 (honoring the server's retry-after), 5xx, and
//! network-level timeouts or connection failures. Application errors
//! (4xx, deserialization) are propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SearchError;

/// Returns `true` if `err` represents a transient condition worth retrying.
fn is_retriable(err: &SearchError) -> bool {
    match err {
        SearchError::RateLimited { .. } => true,
        SearchError::Api { status, .. } => *status >= 500,
        SearchError::Http(source) => source.is_timeout() || source.is_connect(),
        SearchError::Deserialize { .. }
        | SearchError::PaginationLimit { .. }
        | SearchError::MissingCredentials { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient
/// errors, up to `max_retries` additional attempts after the first try.
///
/// The wait before the n-th retry is `backoff_base_ms * 2^(n-1)`, halved
/// and re-filled with random jitter so concurrent workers spread out.
/// A rate-limited response overrides the schedule with the server's own
/// retry-after value.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SearchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SearchError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                err
            }
        };

        let delay_ms = match &err {
            SearchError::RateLimited { retry_after_secs } => {
                retry_after_secs.saturating_mul(1000)
            }
            _ => {
                // Cap the shift to keep the multiplication in range.
                let base = backoff_base_ms.saturating_mul(1u64 << attempt.min(16));
                base / 2 + rand::random_range(0..=base.max(1) / 2)
            }
        };
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient search error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
