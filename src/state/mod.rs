mod squares;
mod team;
mod trivia;

pub use squares::{BoardView, CreateGameInput};
pub use trivia::TriviaQuestionInput;

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default lifetime of a team's answer streak
pub const DEFAULT_STREAK_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// A Squares game together with its claimed cells, locked as one unit
#[derive(Debug, Clone)]
pub struct Board {
    pub game: Game,
    /// Claim order is preserved; round-robin fill depends on it
    pub entries: Vec<Entry>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub boards: Arc<RwLock<HashMap<GameId, Board>>>,
    pub teams: Arc<RwLock<HashMap<TeamId, Team>>>,
    pub trivia_questions: Arc<RwLock<Vec<TriviaQuestion>>>,
    pub trivia_answers: Arc<RwLock<Vec<TriviaAnswer>>>,
    /// Current correct-answer streak per team
    pub team_streaks: TtlCache<TeamId, u32>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_STREAK_TTL, Arc::new(SystemClock))
    }

    pub fn with_streak_ttl(streak_ttl: Duration) -> Self {
        Self::with_clock(streak_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(streak_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            boards: Arc::new(RwLock::new(HashMap::new())),
            teams: Arc::new(RwLock::new(HashMap::new())),
            trivia_questions: Arc::new(RwLock::new(Vec::new())),
            trivia_answers: Arc::new(RwLock::new(Vec::new())),
            team_streaks: TtlCache::with_clock(streak_ttl, clock),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
