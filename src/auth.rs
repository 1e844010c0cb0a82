//! Caller identity and admin authentication
//!
//! Player identity arrives from the upstream auth layer as a header. Admin
//! routes (trivia question management) sit behind HTTP Basic Auth.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request, Response, StatusCode},
    middleware::Next,
};
use base64::Engine;
use std::sync::Arc;

use crate::api::ApiError;
use crate::types::{Game, TeamId, UserId};

/// Header carrying the authenticated user's id
pub const USER_HEADER: &str = "x-user-id";

/// Header carrying the answering trivia team's id
pub const TEAM_HEADER: &str = "x-team-id";

/// Trimmed, non-empty identity header value
pub fn header_identity(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Authenticated caller, taken from [`USER_HEADER`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_identity(&parts.headers, USER_HEADER)
            .map(Caller)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Answering team, taken from [`TEAM_HEADER`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCaller(pub TeamId);

impl<S> FromRequestParts<S> for TeamCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_identity(&parts.headers, TEAM_HEADER)
            .map(TeamCaller)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Only the game's creator may run admin actions on it
pub fn require_creator(game: &Game, caller: &Caller) -> Result<(), ApiError> {
    if game.created_by == caller.0 {
        Ok(())
    } else {
        tracing::warn!(game_id = %game.id, caller = %caller.0, "Rejected non-creator admin action");
        Err(ApiError::Forbidden(
            "Only the game creator can do that".to_string(),
        ))
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Username for admin routes (None = auth disabled)
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    /// ADMIN_USERNAME and ADMIN_PASSWORD must both be set to enable auth
    pub fn from_env() -> Self {
        let username = std::env::var("ADMIN_USERNAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if username.is_some() && password.is_some() {
            tracing::info!("Admin authentication enabled");
            Self { username, password }
        } else {
            if username.is_some() || password.is_some() {
                tracing::warn!(
                    "ADMIN_USERNAME and ADMIN_PASSWORD must both be set to enable authentication"
                );
            }
            tracing::warn!("Admin authentication DISABLED - anyone can manage trivia questions!");
            Self::default()
        }
    }

    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    pub fn validate(&self, username: &str, password: &str) -> bool {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => {
                constant_time_eq(u.as_bytes(), username.as_bytes())
                    && constant_time_eq(p.as_bytes(), password.as_bytes())
            }
            _ => true,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// `(username, password)` from a `Basic` Authorization header
fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Middleware for HTTP Basic Authentication on admin routes
pub async fn admin_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if !auth_config.is_enabled() {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_credentials)
        .is_some_and(|(user, pass)| auth_config.validate(&user, &pass));

    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(uri = %request.uri(), "Rejected admin request");
    let mut response = Response::new(Body::from("Unauthorized"));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        header::HeaderValue::from_static("Basic realm=\"Bowl Party Admin\""),
    );
    response
}
