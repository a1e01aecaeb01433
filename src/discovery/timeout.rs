//! Timeout/fallback racing for slow dependencies.
//!
//! The home screen must never wait on a slow external provider, so remote
//! fetches are raced against a timer. Losing the race abandons the wait
//! (the future is dropped, not cancelled mid-protocol) and the caller
//! proceeds with the fallback value.

use std::future::Future;
use std::time::Duration;

/// Resolve to the future's output, or to `fallback` if `budget` elapses
/// first.
pub async fn with_fallback<T, F>(future: F, budget: Duration, fallback: T) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(budget, future).await {
        Ok(value) => value,
        Err(_) => {
            log::debug!("Fetch exceeded its {:?} budget; using fallback", budget);
            fallback
        }
    }
}
