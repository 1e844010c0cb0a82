use serde::{Deserialize, Serialize};

use crate::scoring::ScoreResult;

/// Opaque ID types for type safety
pub type GameId = String;
pub type EntryId = String;
pub type UserId = String;
pub type TeamId = String;
pub type TriviaQuestionId = String;

/// Squares boards are always 10x10, one row/column per score digit
pub const GRID_SIZE: usize = 10;

/// Number of quarters scored on a Squares board
pub const QUARTERS: usize = 4;

// ========== Squares ==========

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Open,
    Locked,
    InProgress,
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Open => "open",
            GameStatus::Locked => "locked",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative scores of both teams at the end of a quarter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuarterScore {
    pub team_a: u32,
    pub team_b: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub team_a_name: String,
    pub team_b_name: String,
    pub grid_size: usize,
    pub status: GameStatus,
    /// Digit shown on each row (Team A's last digit), assigned at lock
    pub row_numbers: Option<[u8; GRID_SIZE]>,
    /// Digit shown on each column (Team B's last digit), assigned at lock
    pub col_numbers: Option<[u8; GRID_SIZE]>,
    /// Quarter scores, index 0 = Q1
    pub scores: [Option<QuarterScore>; QUARTERS],
    pub max_squares_per_player: Option<u32>,
    pub created_by: UserId,
    pub share_code: String,
    pub entry_fee: u32,
    pub created_at: String,
}

/// A claimed cell on a Squares board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub game_id: GameId,
    pub row_index: u8,
    pub col_index: u8,
    pub player_name: String,
    pub player_user_id: Option<UserId>,
    pub player_emoji: String,
    pub player_color: String,
}

/// A grid coordinate as requested by a client
///
/// Wide and signed so that any integer coordinate reaches the bounds check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: i64,
    pub col: i64,
}

impl Cell {
    pub fn in_bounds(&self) -> bool {
        let range = 0..GRID_SIZE as i64;
        range.contains(&self.row) && range.contains(&self.col)
    }

    /// `(row_index, col_index)` for an in-bounds cell
    pub fn indices(&self) -> Option<(u8, u8)> {
        if !self.in_bounds() {
            return None;
        }
        Some((self.row as u8, self.col as u8))
    }
}

impl From<&Entry> for Cell {
    fn from(entry: &Entry) -> Self {
        Self {
            row: entry.row_index.into(),
            col: entry.col_index.into(),
        }
    }
}

/// Winner of a scored quarter; `entry` is None when the square was never claimed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WinningResult {
    pub quarter: u8,
    pub row: u8,
    pub col: u8,
    pub entry: Option<Entry>,
}

/// One distinct player on a board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSummary {
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub count: usize,
}

/// How empty cells are assigned by a bulk fill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FillMode {
    /// Cycle through existing players in first-claim order
    RoundRobin,
    /// Give every empty cell to one name
    House { name: String },
}

// ========== Trivia ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriviaQuestion {
    pub id: TriviaQuestionId,
    pub question: String,
    pub choices: Vec<String>,
    pub correct_index: usize,
    pub time_limit_seconds: u32,
    pub created_at: String,
}

/// Question as shown to teams, without the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicTriviaQuestion {
    pub id: TriviaQuestionId,
    pub question: String,
    pub choices: Vec<String>,
    pub time_limit_seconds: u32,
}

impl From<&TriviaQuestion> for PublicTriviaQuestion {
    fn from(q: &TriviaQuestion) -> Self {
        Self {
            id: q.id.clone(),
            question: q.question.clone(),
            choices: q.choices.clone(),
            time_limit_seconds: q.time_limit_seconds,
        }
    }
}

/// A team's recorded answer to one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriviaAnswer {
    pub team_id: TeamId,
    pub question_id: TriviaQuestionId,
    pub choice_index: usize,
    pub is_correct: bool,
    pub time_taken_ms: u64,
    pub score: ScoreResult,
    pub answered_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub team_id: TeamId,
    pub team_name: String,
    pub total_points: u32,
    pub correct_answers: u32,
    pub answered: u32,
    pub current_streak: u32,
}
