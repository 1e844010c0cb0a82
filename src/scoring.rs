//! Trivia answer scoring
//!
//! Points for a single answer are a flat base, a fast-answer bonus, and a
//! multiplier taken from the streak the team carried *into* the question.

use serde::{Deserialize, Serialize};

/// Points for any correct answer
pub const BASE_POINTS: u32 = 100;

/// Extra points for answering within [`FAST_ANSWER_MS`]
pub const FAST_ANSWER_BONUS: u32 = 50;

/// Fast-answer threshold. Fixed, not scaled to the question's time limit.
pub const FAST_ANSWER_MS: u64 = 5_000;

/// Default per-question time limit
pub const DEFAULT_TIME_LIMIT_SECONDS: u32 = 15;

/// Multipliers indexed by the streak held before answering; the last entry
/// applies to every longer streak.
const STREAK_MULTIPLIERS: [f64; 6] = [1.0, 1.0, 1.2, 1.5, 2.0, 2.5];

/// Input describing one answer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub time_taken_ms: u64,
    pub time_limit_seconds: u32,
    pub current_streak: u32,
}

/// Points awarded for one answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub base_points: u32,
    pub streak_multiplier: f64,
    pub streak_bonus: i64,
    pub total_points: u32,
    pub new_streak: u32,
}

/// Base points for an answer: 0 when wrong, 100 when right, +50 when the
/// answer came in within five seconds.
///
/// `_time_limit_seconds` is accepted for call-site symmetry but does not
/// move the fast-answer threshold.
pub fn calculate_base_points(
    is_correct: bool,
    time_taken_ms: u64,
    _time_limit_seconds: u32,
) -> u32 {
    if !is_correct {
        return 0;
    }

    if time_taken_ms <= FAST_ANSWER_MS {
        BASE_POINTS + FAST_ANSWER_BONUS
    } else {
        BASE_POINTS
    }
}

/// Multiplier for the current answer given the streak accumulated before it
pub fn calculate_streak_multiplier(current_streak: u32) -> f64 {
    let idx = (current_streak as usize).min(STREAK_MULTIPLIERS.len() - 1);
    STREAK_MULTIPLIERS[idx]
}

/// Apply the multiplier and return `(total_points, streak_bonus)`.
///
/// `f64::round` rounds half away from zero, which matches half-up for the
/// non-negative products seen here.
pub fn calculate_total_points(base_points: u32, streak_multiplier: f64) -> (u32, i64) {
    let total = (base_points as f64 * streak_multiplier).round();
    let total_points = if total <= 0.0 { 0 } else { total as u32 };
    let streak_bonus = total_points as i64 - base_points as i64;
    (total_points, streak_bonus)
}

/// Score one answer.
pub fn calculate_score(
    is_correct: bool,
    time_taken_ms: u64,
    current_streak: u32,
    time_limit_seconds: u32,
) -> ScoreResult {
    let base_points = calculate_base_points(is_correct, time_taken_ms, time_limit_seconds);
    let streak_multiplier = if is_correct {
        calculate_streak_multiplier(current_streak)
    } else {
        1.0
    };
    let (total_points, streak_bonus) = calculate_total_points(base_points, streak_multiplier);
    let new_streak = if is_correct {
        current_streak.saturating_add(1)
    } else {
        0
    };

    ScoreResult {
        base_points,
        streak_multiplier,
        streak_bonus,
        total_points,
        new_streak,
    }
}

impl AnswerOutcome {
    pub fn score(&self) -> ScoreResult {
        calculate_score(
            self.is_correct,
            self.time_taken_ms,
            self.current_streak,
            self.time_limit_seconds,
        )
    }
}
