use std::net::SocketAddr;
use std::time::Duration;

use crate::state::DEFAULT_STREAK_TTL;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);

/// Server-level settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub streak_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            streak_ttl: DEFAULT_STREAK_TTL,
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables, falling back to defaults on bad values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %v, error = %e, "Invalid BIND_ADDR, using default");
                defaults.bind_addr
            }),
            Err(_) => defaults.bind_addr,
        };

        let streak_ttl = match std::env::var("STREAK_TTL_HOURS") {
            Ok(v) => v
                .parse::<u64>()
                .ok()
                .filter(|h| *h > 0)
                .and_then(|h| h.checked_mul(60 * 60))
                .map(Duration::from_secs)
                .unwrap_or_else(|| {
                    tracing::warn!(value = %v, "Invalid STREAK_TTL_HOURS, using default");
                    defaults.streak_ttl
                }),
            Err(_) => defaults.streak_ttl,
        };

        Self {
            bind_addr,
            streak_ttl,
        }
    }
}
