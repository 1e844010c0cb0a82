use crate::types::Cell;

/// Result type for Squares board operations
pub type SquaresResult<T> = Result<T, SquaresError>;

/// Errors raised by the Squares board rules
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SquaresError {
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    #[error("Square limit reached: player holds {current} of {max} allowed squares, requested {requested} more")]
    QuotaExceeded {
        current: usize,
        max: u32,
        requested: usize,
    },

    #[error("No existing players to fill the board with")]
    NoPlayers,

    #[error("Square ({}, {}) is already claimed", .0.row, .0.col)]
    DuplicateClaim(Cell),

    #[error("Square ({}, {}) is outside the board", .0.row, .0.col)]
    OutOfBounds(Cell),

    #[error("No squares requested")]
    EmptyClaim,
}

impl SquaresError {
    /// Stable machine-readable kind for API responses
    pub fn code(&self) -> &'static str {
        match self {
            SquaresError::InvalidState(_) => "INVALID_STATE",
            SquaresError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            SquaresError::NoPlayers => "NO_PLAYERS",
            SquaresError::DuplicateClaim(_) => "DUPLICATE_CLAIM",
            SquaresError::OutOfBounds(_) => "OUT_OF_BOUNDS",
            SquaresError::EmptyClaim => "EMPTY_CLAIM",
        }
    }
}
