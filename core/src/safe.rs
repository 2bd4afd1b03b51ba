//! Graceful degradation: turn any failed request into a caller-chosen value.
//!
//! Views wrap their reads in `safe` so an unreachable backend renders
//! fixtures or last-known-good data instead of an empty panel. The failure is
//! masked from the caller but still logged at `debug`.

use std::future::Future;

use tracing::debug;

use crate::error::ApiError;

/// Resolve to the request's value, or to `fallback` on any failure.
pub async fn safe<T, F>(request: F, fallback: T) -> T
where
    F: Future<Output = Result<T, ApiError>>,
{
    match request.await {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, retryable = e.is_retryable(), "request failed, using fallback");
            fallback
        }
    }
}

/// Like `safe`, with the fallback built from the error only when needed.
pub async fn safe_else<T, F, G>(request: F, fallback: G) -> T
where
    F: Future<Output = Result<T, ApiError>>,
    G: FnOnce(&ApiError) -> T,
{
    match request.await {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, retryable = e.is_retryable(), "request failed, using fallback");
            fallback(&e)
        }
    }
}
