//! Trivia question pool and answer scoring
//!
//! Each team answers a question once. The streak a team carries into the
//! answer comes from the streak cache and is written back afterwards.

use super::AppState;
use crate::api::ApiError;
use crate::scoring::{calculate_score, DEFAULT_TIME_LIMIT_SECONDS};
use crate::types::*;
use serde::{Deserialize, Serialize};

const MIN_CHOICES: usize = 2;
const MAX_CHOICES: usize = 4;

/// Input for creating a new trivia question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriviaQuestionInput {
    pub question: String,
    pub choices: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
}

impl AppState {
    // =========================================================================
    // Trivia Question CRUD
    // =========================================================================

    pub async fn add_trivia_question(
        &self,
        input: TriviaQuestionInput,
    ) -> Result<TriviaQuestion, ApiError> {
        let question = input.question.trim().to_string();
        if question.is_empty() {
            return Err(ApiError::BadRequest("Question cannot be empty".to_string()));
        }

        let choices: Vec<String> = input.choices.iter().map(|c| c.trim().to_string()).collect();
        if !(MIN_CHOICES..=MAX_CHOICES).contains(&choices.len()) {
            return Err(ApiError::BadRequest(format!(
                "A question needs {} to {} choices",
                MIN_CHOICES, MAX_CHOICES
            )));
        }
        if choices.iter().any(|c| c.is_empty()) {
            return Err(ApiError::BadRequest("Choices cannot be empty".to_string()));
        }
        if input.correct_index >= choices.len() {
            return Err(ApiError::BadRequest(format!(
                "correct_index {} is out of range",
                input.correct_index
            )));
        }

        let time_limit_seconds = input
            .time_limit_seconds
            .unwrap_or(DEFAULT_TIME_LIMIT_SECONDS);
        if time_limit_seconds == 0 {
            return Err(ApiError::BadRequest(
                "time_limit_seconds must be positive".to_string(),
            ));
        }

        let trivia_question = TriviaQuestion {
            id: ulid::Ulid::new().to_string(),
            question,
            choices,
            correct_index: input.correct_index,
            time_limit_seconds,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.trivia_questions
            .write()
            .await
            .push(trivia_question.clone());

        tracing::info!("Added trivia question: {}", trivia_question.id);
        Ok(trivia_question)
    }

    pub async fn get_trivia_questions(&self) -> Vec<TriviaQuestion> {
        self.trivia_questions.read().await.clone()
    }

    pub async fn get_trivia_question(&self, id: &TriviaQuestionId) -> Option<TriviaQuestion> {
        self.trivia_questions
            .read()
            .await
            .iter()
            .find(|q| &q.id == id)
            .cloned()
    }

    // =========================================================================
    // Answering
    // =========================================================================

    /// Score and record a team's answer
    pub async fn submit_trivia_answer(
        &self,
        team_id: &TeamId,
        question_id: &TriviaQuestionId,
        choice_index: usize,
        time_taken_ms: u64,
    ) -> Result<TriviaAnswer, ApiError> {
        if self.get_team(team_id).await.is_none() {
            return Err(ApiError::NotFound("Team not found".to_string()));
        }
        let question = self
            .get_trivia_question(question_id)
            .await
            .ok_or_else(|| ApiError::NotFound("Trivia question not found".to_string()))?;
        if choice_index >= question.choices.len() {
            return Err(ApiError::BadRequest(format!(
                "Invalid choice index (must be below {})",
                question.choices.len()
            )));
        }

        // Held across the streak read/write so a team's answers apply in order
        let mut answers = self.trivia_answers.write().await;
        if answers
            .iter()
            .any(|a| &a.team_id == team_id && &a.question_id == question_id)
        {
            return Err(ApiError::Conflict(
                "Team has already answered this question".to_string(),
            ));
        }

        let is_correct = choice_index == question.correct_index;
        let current_streak = self.get_team_streak(team_id).await;
        let score = calculate_score(
            is_correct,
            time_taken_ms,
            current_streak,
            question.time_limit_seconds,
        );

        let answer = TriviaAnswer {
            team_id: team_id.clone(),
            question_id: question_id.clone(),
            choice_index,
            is_correct,
            time_taken_ms,
            score,
            answered_at: chrono::Utc::now().to_rfc3339(),
        };
        answers.push(answer.clone());
        self.team_streaks
            .insert(team_id.clone(), score.new_streak)
            .await;

        tracing::info!(
            team_id = %team_id,
            question_id = %question_id,
            is_correct,
            points = score.total_points,
            streak = score.new_streak,
            "Trivia answer scored"
        );
        Ok(answer)
    }
}
