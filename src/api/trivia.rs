//! Team registration, trivia questions, answers and the leaderboard

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiJson};
use crate::auth::TeamCaller;
use crate::state::{AppState, TriviaQuestionInput};
use crate::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTeamRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// Optional; must match the `x-team-id` header when present
    #[serde(default)]
    pub team_id: Option<TeamId>,
    pub question_id: TriviaQuestionId,
    pub choice_index: usize,
    pub time_taken_ms: u64,
}

/// POST /api/teams
pub async fn register_team(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = state.register_team(&req.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /api/leaderboard
pub async fn leaderboard(State(state): State<Arc<AppState>>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.get_leaderboard().await)
}

/// GET /api/trivia/questions
///
/// The correct answer is never included.
pub async fn list_questions(State(state): State<Arc<AppState>>) -> Json<Vec<PublicTriviaQuestion>> {
    let questions = state.get_trivia_questions().await;
    Json(questions.iter().map(PublicTriviaQuestion::from).collect())
}

/// POST /api/admin/trivia/questions
pub async fn add_question(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<TriviaQuestionInput>,
) -> Result<(StatusCode, Json<TriviaQuestion>), ApiError> {
    let question = state.add_trivia_question(input).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// POST /api/trivia/answer
///
/// The answering team comes from `x-team-id`, which also keys the rate limit.
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    TeamCaller(team_id): TeamCaller,
    ApiJson(req): ApiJson<AnswerRequest>,
) -> Result<Json<TriviaAnswer>, ApiError> {
    if req.team_id.as_ref().is_some_and(|id| id != &team_id) {
        tracing::warn!(team_id = %team_id, "Answer body team_id does not match header");
        return Err(ApiError::Forbidden(
            "team_id does not match the x-team-id header".to_string(),
        ));
    }

    let answer = state
        .submit_trivia_answer(
            &team_id,
            &req.question_id,
            req.choice_index,
            req.time_taken_ms,
        )
        .await?;
    Ok(Json(answer))
}
