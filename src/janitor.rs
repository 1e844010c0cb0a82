use crate::rate_limit::RateLimitConfig;
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a background task that drops expired streaks and rate-limit windows
pub fn spawn_cache_cleanup(
    state: Arc<AppState>,
    rate_limits: Arc<RateLimitConfig>,
    every: Duration,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick fires immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            let streaks = state.team_streaks.cleanup().await;
            let windows = match rate_limits.rate_limiter {
                Some(ref limiter) => limiter.cleanup().await,
                None => 0,
            };

            if streaks > 0 || windows > 0 {
                tracing::debug!(streaks, windows, "Expired cache entries removed");
            }
        }
    });
}
