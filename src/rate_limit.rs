//! Per-caller request throttling
//!
//! Fixed-window counters keyed by caller identity, stored in a [`TtlCache`]
//! so a window disappears on its own once it ends.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, Response, StatusCode},
    middleware::Next,
};
use std::{sync::Arc, time::Duration};

use crate::auth::{header_identity, TEAM_HEADER, USER_HEADER};
use crate::cache::{Clock, SystemClock, TtlCache};

const DEFAULT_WINDOW_SECS: u64 = 10;

/// One day
const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: TtlCache<String, u32>,
    max_requests: u32,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(DEFAULT_WINDOW_SECS)) // 30 requests per 10 seconds
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: TtlCache::with_clock(window, clock),
            max_requests,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns true if the request is allowed
    pub async fn check(&self, key: &str) -> bool {
        let now = self.windows.now();
        let max = self.max_requests;
        let expires_at = self.windows.expiry_from(now);

        self.windows
            .update(key.to_string(), |current| match current {
                Some((&count, expires_at)) if count >= max => (Some((count, expires_at)), false),
                Some((&count, expires_at)) => (Some((count + 1, expires_at)), true),
                None => (Some((1, expires_at)), true),
            })
            .await
    }

    pub async fn cleanup(&self) -> usize {
        self.windows.cleanup().await
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// None = disabled
    pub rate_limiter: Option<RateLimiter>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate_limiter: Some(RateLimiter::default()),
        }
    }
}

impl RateLimitConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("RATE_LIMIT")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(true);

        let max_requests = std::env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let window_secs = match std::env::var("RATE_LIMIT_WINDOW") {
            Ok(v) => match v.parse::<u64>() {
                Ok(secs) if (1..=MAX_WINDOW_SECS).contains(&secs) => secs,
                _ => {
                    tracing::warn!(value = %v, "Invalid RATE_LIMIT_WINDOW, using default");
                    DEFAULT_WINDOW_SECS
                }
            },
            Err(_) => DEFAULT_WINDOW_SECS,
        };

        tracing::info!(enabled, max_requests, window_secs, "Rate limit config loaded");

        Self {
            rate_limiter: enabled
                .then(|| RateLimiter::new(max_requests, Duration::from_secs(window_secs))),
        }
    }

    pub fn disabled() -> Self {
        Self { rate_limiter: None }
    }
}

/// Caller key from the identity headers; anonymous requests are not limited
///
/// Routes behind this middleware reject requests without their header, so
/// an unkeyed request never reaches a handler.
fn get_rate_limit_key(request: &Request<Body>) -> Option<String> {
    let headers = request.headers();
    if let Some(user) = header_identity(headers, USER_HEADER) {
        return Some(format!("user:{}", user));
    }
    header_identity(headers, TEAM_HEADER).map(|team| format!("team:{}", team))
}

fn rate_limited(retry_after: Duration) -> Response<Body> {
    let mut response = Response::new(Body::from(
        r#"{"code":"RATE_LIMITED","msg":"Rate limit exceeded. Please slow down."}"#,
    ));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(header::RETRY_AFTER, retry_after.as_secs().max(1).into());
    response
}

pub async fn rate_limit_middleware(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if let Some(ref limiter) = config.rate_limiter {
        if let Some(key) = get_rate_limit_key(&request) {
            if !limiter.check(&key).await {
                tracing::warn!(key = %key, "Rate limited");
                return rate_limited(limiter.window());
            }
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serial_test::serial;

    fn limiter(max: u32, window_secs: u64) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(max, Duration::from_secs(window_secs), clock.clone());
        (limiter, clock)
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_normal_traffic() {
        let (limiter, _clock) = limiter(5, 1);

        for _ in 0..5 {
            assert!(limiter.check("test-key").await);
        }
        assert!(!limiter.check("test-key").await);
    }

    #[tokio::test]
    async fn test_rate_limiter_different_keys() {
        let (limiter, _clock) = limiter(2, 1);

        assert!(limiter.check("key1").await);
        assert!(limiter.check("key1").await);
        assert!(!limiter.check("key1").await);

        assert!(limiter.check("key2").await);
        assert!(limiter.check("key2").await);
        assert!(!limiter.check("key2").await);
    }

    #[tokio::test]
    async fn test_rate_limiter_window_reset() {
        let (limiter, clock) = limiter(2, 10);

        assert!(limiter.check("key").await);
        clock.advance(Duration::from_secs(5));
        assert!(limiter.check("key").await);
        assert!(!limiter.check("key").await);

        // The window is anchored at the first request, not the last
        clock.advance(Duration::from_secs(5));
        assert!(limiter.check("key").await);
    }

    #[tokio::test]
    async fn test_rate_limiter_cleanup() {
        let (limiter, clock) = limiter(2, 10);
        limiter.check("a").await;
        limiter.check("b").await;
        clock.advance(Duration::from_secs(11));
        assert_eq!(limiter.cleanup().await, 2);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("RATE_LIMIT", "false");
        assert!(RateLimitConfig::from_env().rate_limiter.is_none());

        std::env::set_var("RATE_LIMIT", "1");
        std::env::set_var("RATE_LIMIT_MAX", "7");
        std::env::set_var("RATE_LIMIT_WINDOW", "60");
        let config = RateLimitConfig::from_env();
        let limiter = config.rate_limiter.expect("enabled");
        assert_eq!(limiter.max_requests, 7);
        assert_eq!(limiter.window(), Duration::from_secs(60));

        for bad in ["0", "18446744073709551615", "soon"] {
            std::env::set_var("RATE_LIMIT_WINDOW", bad);
            let limiter = RateLimitConfig::from_env().rate_limiter.expect("enabled");
            assert_eq!(limiter.window(), Duration::from_secs(DEFAULT_WINDOW_SECS));
        }

        std::env::remove_var("RATE_LIMIT");
        std::env::remove_var("RATE_LIMIT_MAX");
        std::env::remove_var("RATE_LIMIT_WINDOW");
    }

    #[tokio::test]
    async fn test_rate_limiter_huge_window() {
        let limiter = RateLimiter::with_clock(1, Duration::MAX, Arc::new(ManualClock::new()));
        assert!(limiter.check("key").await);
        assert!(!limiter.check("key").await);
    }

    #[test]
    fn test_rate_limit_key() {
        let request = Request::builder()
            .header(USER_HEADER, "u1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_rate_limit_key(&request), Some("user:u1".to_string()));

        let request = Request::builder()
            .header(TEAM_HEADER, "t1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_rate_limit_key(&request), Some("team:t1".to_string()));

        // Same bucket as the trimmed id the extractors see
        let request = Request::builder()
            .header(USER_HEADER, " u1 ")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_rate_limit_key(&request), Some("user:u1".to_string()));

        let request = Request::builder()
            .header(USER_HEADER, "  ")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_rate_limit_key(&request), None);

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(get_rate_limit_key(&request), None);
    }
}
