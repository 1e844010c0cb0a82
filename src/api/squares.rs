//! Squares board endpoints
//!
//! Admin actions (lock, reshuffle, scores, fill, entry removal) are limited to
//! the caller who created the game.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiJson};
use crate::auth::{require_creator, Caller};
use crate::squares::BoardNumbers;
use crate::state::{AppState, BoardView, CreateGameInput};
use crate::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub player_name: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub quarter: u8,
    pub team_a: u32,
    pub team_b: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResponse {
    pub quarter: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub count: usize,
    pub entries: Vec<Entry>,
}

impl From<Vec<Entry>> for EntriesResponse {
    fn from(entries: Vec<Entry>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

async fn load_as_creator(
    state: &AppState,
    game_id: &GameId,
    caller: &Caller,
) -> Result<Game, ApiError> {
    let game = state
        .get_game(game_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Game not found".to_string()))?;
    require_creator(&game, caller)?;
    Ok(game)
}

/// POST /api/squares
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(input): ApiJson<CreateGameInput>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let game = state.create_game(&caller.0, input).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// GET /api/squares/{id}
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> Result<Json<BoardView>, ApiError> {
    state
        .get_board(&game_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Game not found".to_string()))
}

/// GET /api/squares/share/{code}
pub async fn get_board_by_share_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<BoardView>, ApiError> {
    let game = state
        .get_game_by_share_code(&code)
        .await
        .ok_or_else(|| ApiError::NotFound("No game with that share code".to_string()))?;
    get_board(State(state), Path(game.id)).await
}

/// POST /api/squares/{id}/claim
pub async fn claim_squares(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    caller: Caller,
    ApiJson(req): ApiJson<ClaimRequest>,
) -> Result<(StatusCode, Json<EntriesResponse>), ApiError> {
    let created = state
        .claim_squares(&game_id, &req.player_name, Some(caller.0), &req.cells)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// DELETE /api/squares/{id}/entries/{entry_id}
pub async fn remove_entry(
    State(state): State<Arc<AppState>>,
    Path((game_id, entry_id)): Path<(GameId, EntryId)>,
    caller: Caller,
) -> Result<Json<Entry>, ApiError> {
    load_as_creator(&state, &game_id, &caller).await?;
    let removed = state.remove_entry(&game_id, &entry_id).await?;
    Ok(Json(removed))
}

/// POST /api/squares/{id}/lock
pub async fn lock_board(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    caller: Caller,
) -> Result<Json<BoardNumbers>, ApiError> {
    load_as_creator(&state, &game_id, &caller).await?;
    Ok(Json(state.lock_game(&game_id).await?))
}

/// POST /api/squares/{id}/reshuffle
pub async fn reshuffle_numbers(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    caller: Caller,
) -> Result<Json<BoardNumbers>, ApiError> {
    load_as_creator(&state, &game_id, &caller).await?;
    Ok(Json(state.reshuffle_game(&game_id).await?))
}

/// POST /api/squares/{id}/scores
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    caller: Caller,
    ApiJson(req): ApiJson<ScoreRequest>,
) -> Result<Json<WinningResult>, ApiError> {
    load_as_creator(&state, &game_id, &caller).await?;
    let score = QuarterScore {
        team_a: req.team_a,
        team_b: req.team_b,
    };
    Ok(Json(
        state
            .submit_quarter_score(&game_id, req.quarter, score)
            .await?,
    ))
}

/// DELETE /api/squares/{id}/scores
pub async fn undo_score(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    caller: Caller,
) -> Result<Json<UndoResponse>, ApiError> {
    load_as_creator(&state, &game_id, &caller).await?;
    let quarter = state.undo_quarter_score(&game_id).await?;
    Ok(Json(UndoResponse { quarter }))
}

/// POST /api/squares/{id}/fill
pub async fn bulk_fill(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    caller: Caller,
    ApiJson(mode): ApiJson<FillMode>,
) -> Result<(StatusCode, Json<EntriesResponse>), ApiError> {
    load_as_creator(&state, &game_id, &caller).await?;
    let created = state.bulk_fill(&game_id, mode).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}
