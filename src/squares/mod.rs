//! Super Bowl Squares board rules
//!
//! Pure functions over a [`Game`](crate::types::Game) and its claimed
//! [`Entry`](crate::types::Entry) list. Nothing here touches storage; callers
//! hold the game lock while applying results.

pub mod claims;
pub mod error;
pub mod grid;
pub mod players;

pub use claims::{
    can_claim, check_quota, empty_cells, plan_bulk_fill, plan_claim, validate_claim, NewEntry,
};
pub use error::{SquaresError, SquaresResult};
pub use grid::{
    get_latest_quarter, get_winning_position, get_winning_square, lock_board, quarter_results,
    resolve_quarter, reshuffle_numbers, shuffled_digits, submit_quarter_score, undo_quarter_score,
    BoardNumbers, Position, QuarterOutcome, WinningSquare,
};
pub use players::{
    count_claimed, count_player_squares, get_player_color, get_player_emoji, get_unique_players,
    is_board_full,
};
