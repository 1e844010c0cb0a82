use super::AppState;
use crate::api::ApiError;
use crate::types::*;

const MAX_TEAM_NAME_CHARS: usize = 40;

impl AppState {
    /// Register a trivia team. Names are unique ignoring case.
    pub async fn register_team(&self, name: &str) -> Result<Team, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::BadRequest("Team name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_TEAM_NAME_CHARS {
            return Err(ApiError::BadRequest(format!(
                "Team name must be at most {} characters",
                MAX_TEAM_NAME_CHARS
            )));
        }

        let mut teams = self.teams.write().await;
        let lowered = name.to_lowercase();
        if teams.values().any(|t| t.name.to_lowercase() == lowered) {
            return Err(ApiError::Conflict(format!(
                "Team name '{}' is already taken",
                name
            )));
        }

        let team = Team {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        teams.insert(team.id.clone(), team.clone());

        tracing::info!(team_id = %team.id, name = %team.name, "Team registered");
        Ok(team)
    }

    pub async fn get_team(&self, team_id: &TeamId) -> Option<Team> {
        self.teams.read().await.get(team_id).cloned()
    }

    /// Streak carried into the team's next answer; an expired streak is 0
    pub async fn get_team_streak(&self, team_id: &TeamId) -> u32 {
        self.team_streaks.get(team_id).await.unwrap_or(0)
    }

    /// Cumulative standings, highest points first
    pub async fn get_leaderboard(&self) -> Vec<LeaderboardEntry> {
        let teams = self.teams.read().await;
        let answers = self.trivia_answers.read().await;

        let mut board: Vec<LeaderboardEntry> = teams
            .values()
            .map(|team| LeaderboardEntry {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                total_points: 0,
                correct_answers: 0,
                answered: 0,
                current_streak: 0,
            })
            .collect();

        for entry in board.iter_mut() {
            for answer in answers.iter().filter(|a| a.team_id == entry.team_id) {
                entry.total_points += answer.score.total_points;
                entry.answered += 1;
                if answer.is_correct {
                    entry.correct_answers += 1;
                }
            }
        }
        drop(answers);
        drop(teams);

        for entry in board.iter_mut() {
            entry.current_streak = self.get_team_streak(&entry.team_id).await;
        }

        board.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.team_name.cmp(&b.team_name))
        });
        board
    }
}
