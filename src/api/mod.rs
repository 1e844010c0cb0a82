//! HTTP API
//!
//! JSON in, JSON out. Errors render as `{"code": ..., "msg": ...}`.

mod error;
mod json;
pub mod squares;
pub mod trivia;

pub use error::{ApiError, ErrorBody};
pub use json::ApiJson;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::{self, AuthConfig};
use crate::rate_limit::{self, RateLimitConfig};
use crate::state::AppState;

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// Build the API router
pub fn router(
    state: Arc<AppState>,
    auth_config: Arc<AuthConfig>,
    rate_limit_config: Arc<RateLimitConfig>,
) -> Router {
    // Admin routes (with HTTP Basic Auth)
    let admin_routes = Router::new()
        .route("/api/admin/trivia/questions", post(trivia::add_question))
        .layer(middleware::from_fn_with_state(
            auth_config,
            auth::admin_auth_middleware,
        ));

    // Routes players can hammer
    let limited_routes = Router::new()
        .route("/api/trivia/answer", post(trivia::submit_answer))
        .route("/api/squares/{id}/claim", post(squares::claim_squares))
        .layer(middleware::from_fn_with_state(
            rate_limit_config,
            rate_limit::rate_limit_middleware,
        ));

    let open_routes = Router::new()
        .route("/health", get(health))
        .route("/api/teams", post(trivia::register_team))
        .route("/api/leaderboard", get(trivia::leaderboard))
        .route("/api/trivia/questions", get(trivia::list_questions))
        .route("/api/squares", post(squares::create_game))
        .route("/api/squares/share/{code}", get(squares::get_board_by_share_code))
        .route("/api/squares/{id}", get(squares::get_board))
        .route(
            "/api/squares/{id}/entries/{entry_id}",
            delete(squares::remove_entry),
        )
        .route("/api/squares/{id}/lock", post(squares::lock_board))
        .route("/api/squares/{id}/reshuffle", post(squares::reshuffle_numbers))
        .route(
            "/api/squares/{id}/scores",
            post(squares::submit_score).delete(squares::undo_score),
        )
        .route("/api/squares/{id}/fill", post(squares::bulk_fill));

    Router::new()
        .merge(admin_routes)
        .merge(limited_routes)
        .merge(open_routes)
        .with_state(state)
}
