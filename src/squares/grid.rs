//! Board numbers and quarter winners
//!
//! Rows carry Team A's last score digit, columns carry Team B's. Both digit
//! sequences are hidden until the board is locked.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{SquaresError, SquaresResult};
use crate::types::{Entry, Game, GameStatus, QuarterScore, WinningResult, GRID_SIZE, QUARTERS};

/// Digit assignment for a locked board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardNumbers {
    pub row_numbers: [u8; GRID_SIZE],
    pub col_numbers: [u8; GRID_SIZE],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningSquare {
    pub row: u8,
    pub col: u8,
    pub entry: Entry,
}

/// Where a quarter stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuarterOutcome {
    /// Scores not entered (or board not locked)
    Pending,
    /// Winning square exists but nobody claimed it
    Unclaimed { row: u8, col: u8 },
    Winner { row: u8, col: u8, entry: Entry },
}

/// Uniform random permutation of 0..=9 (Fisher-Yates via `SliceRandom::shuffle`)
pub fn shuffled_digits<R: Rng + ?Sized>(rng: &mut R) -> [u8; GRID_SIZE] {
    let mut digits: [u8; GRID_SIZE] = std::array::from_fn(|i| i as u8);
    digits.shuffle(rng);
    digits
}

fn assign_numbers<R: Rng + ?Sized>(game: &mut Game, rng: &mut R) -> BoardNumbers {
    let numbers = BoardNumbers {
        row_numbers: shuffled_digits(rng),
        col_numbers: shuffled_digits(rng),
    };
    game.row_numbers = Some(numbers.row_numbers);
    game.col_numbers = Some(numbers.col_numbers);
    numbers
}

/// Lock an open board and reveal its numbers
pub fn lock_board<R: Rng + ?Sized>(game: &mut Game, rng: &mut R) -> SquaresResult<BoardNumbers> {
    if game.status != GameStatus::Open {
        return Err(SquaresError::InvalidState(format!(
            "board can only be locked while open (status: {})",
            game.status
        )));
    }

    let numbers = assign_numbers(game, rng);
    game.status = GameStatus::Locked;
    Ok(numbers)
}

/// Draw new numbers for a locked board that has no scores yet
pub fn reshuffle_numbers<R: Rng + ?Sized>(
    game: &mut Game,
    rng: &mut R,
) -> SquaresResult<BoardNumbers> {
    if game.status != GameStatus::Locked {
        return Err(SquaresError::InvalidState(format!(
            "numbers can only be reshuffled while locked (status: {})",
            game.status
        )));
    }
    if get_latest_quarter(game) > 0 {
        return Err(SquaresError::InvalidState(
            "numbers cannot be reshuffled once a quarter has been scored".to_string(),
        ));
    }

    Ok(assign_numbers(game, rng))
}

fn quarter_slot(quarter: u8) -> Option<usize> {
    (1..=QUARTERS as u8)
        .contains(&quarter)
        .then(|| quarter as usize - 1)
}

/// Highest consecutively scored quarter, 0 if none
pub fn get_latest_quarter(game: &Game) -> u8 {
    game.scores.iter().take_while(|s| s.is_some()).count() as u8
}

pub fn quarter_score(game: &Game, quarter: u8) -> Option<QuarterScore> {
    game.scores[quarter_slot(quarter)?]
}

/// Record the end-of-quarter score. Quarters must be entered in order.
pub fn submit_quarter_score(
    game: &mut Game,
    quarter: u8,
    score: QuarterScore,
) -> SquaresResult<()> {
    if !matches!(game.status, GameStatus::Locked | GameStatus::InProgress) {
        return Err(SquaresError::InvalidState(format!(
            "scores can only be entered after locking (status: {})",
            game.status
        )));
    }

    let next = get_latest_quarter(game) + 1;
    let slot = quarter_slot(quarter)
        .ok_or_else(|| SquaresError::InvalidState(format!("quarter {} does not exist", quarter)))?;
    if quarter != next {
        return Err(SquaresError::InvalidState(format!(
            "expected a score for quarter {}, got quarter {}",
            next, quarter
        )));
    }

    game.scores[slot] = Some(score);
    game.status = if quarter as usize == QUARTERS {
        GameStatus::Completed
    } else {
        GameStatus::InProgress
    };
    Ok(())
}

/// Clear the latest quarter's score; returns the cleared quarter
pub fn undo_quarter_score(game: &mut Game) -> SquaresResult<u8> {
    let latest = get_latest_quarter(game);
    if latest == 0 {
        return Err(SquaresError::InvalidState(
            "no quarter score to undo".to_string(),
        ));
    }

    game.scores[latest as usize - 1] = None;
    game.status = if latest == 1 {
        GameStatus::Locked
    } else {
        GameStatus::InProgress
    };
    Ok(latest)
}

/// Row/column whose digits match the last digit of each team's score
pub fn get_winning_position(game: &Game, quarter: u8) -> Option<Position> {
    let score = quarter_score(game, quarter)?;
    let row_numbers = game.row_numbers.as_ref()?;
    let col_numbers = game.col_numbers.as_ref()?;

    let digit_a = (score.team_a % 10) as u8;
    let digit_b = (score.team_b % 10) as u8;
    let row = row_numbers.iter().position(|&d| d == digit_a)?;
    let col = col_numbers.iter().position(|&d| d == digit_b)?;

    Some(Position {
        row: row as u8,
        col: col as u8,
    })
}

fn entry_at(entries: &[Entry], row: u8, col: u8) -> Option<&Entry> {
    entries
        .iter()
        .find(|e| e.row_index == row && e.col_index == col)
}

/// Claimed winning square for a quarter, None if pending or unclaimed
pub fn get_winning_square(game: &Game, quarter: u8, entries: &[Entry]) -> Option<WinningSquare> {
    let pos = get_winning_position(game, quarter)?;
    let entry = entry_at(entries, pos.row, pos.col)?;
    Some(WinningSquare {
        row: pos.row,
        col: pos.col,
        entry: entry.clone(),
    })
}

pub fn resolve_quarter(game: &Game, quarter: u8, entries: &[Entry]) -> QuarterOutcome {
    let Some(pos) = get_winning_position(game, quarter) else {
        return QuarterOutcome::Pending;
    };

    match entry_at(entries, pos.row, pos.col) {
        Some(entry) => QuarterOutcome::Winner {
            row: pos.row,
            col: pos.col,
            entry: entry.clone(),
        },
        None => QuarterOutcome::Unclaimed {
            row: pos.row,
            col: pos.col,
        },
    }
}

/// Results for every scored quarter, in quarter order
pub fn quarter_results(game: &Game, entries: &[Entry]) -> Vec<WinningResult> {
    (1..=get_latest_quarter(game))
        .filter_map(|quarter| {
            let pos = get_winning_position(game, quarter)?;
            Some(WinningResult {
                quarter,
                row: pos.row,
                col: pos.col,
                entry: entry_at(entries, pos.row, pos.col).cloned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squares::test_support::{entry, open_game};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn locked_game() -> Game {
        let mut game = open_game();
        game.status = GameStatus::Locked;
        game.row_numbers = Some([7, 2, 9, 0, 3, 5, 1, 8, 4, 6]);
        game.col_numbers = Some([0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        game
    }

    fn score(a: u32, b: u32) -> QuarterScore {
        QuarterScore {
            team_a: a,
            team_b: b,
        }
    }

    fn is_permutation(digits: &[u8; GRID_SIZE]) -> bool {
        let mut sorted = *digits;
        sorted.sort_unstable();
        sorted == [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]
    }

    #[test]
    fn test_lock_board_assigns_permutations() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut game = open_game();

        let numbers = lock_board(&mut game, &mut rng).unwrap();

        assert_eq!(game.status, GameStatus::Locked);
        assert!(is_permutation(&numbers.row_numbers));
        assert!(is_permutation(&numbers.col_numbers));
        assert_eq!(game.row_numbers, Some(numbers.row_numbers));
        assert_eq!(game.col_numbers, Some(numbers.col_numbers));
    }

    #[test]
    fn test_lock_board_rejects_non_open() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = locked_game();
        let before = game.row_numbers;

        let result = lock_board(&mut game, &mut rng);
        assert!(matches!(result, Err(SquaresError::InvalidState(_))));
        assert_eq!(game.row_numbers, before);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 20_000;
        // counts[pos][digit]
        let mut counts = [[0u32; GRID_SIZE]; GRID_SIZE];
        for _ in 0..trials {
            let digits = shuffled_digits(&mut rng);
            assert!(is_permutation(&digits));
            for (pos, &d) in digits.iter().enumerate() {
                counts[pos][d as usize] += 1;
            }
        }

        // Expected 2000 per (pos, digit); allow a generous band
        for row in counts.iter() {
            for &c in row.iter() {
                assert!((1700..=2300).contains(&c), "count {} out of range", c);
            }
        }
    }

    #[test]
    fn test_reshuffle_only_before_scores() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = open_game();
        assert!(matches!(
            reshuffle_numbers(&mut game, &mut rng),
            Err(SquaresError::InvalidState(_))
        ));

        lock_board(&mut game, &mut rng).unwrap();
        let numbers = reshuffle_numbers(&mut game, &mut rng).unwrap();
        assert!(is_permutation(&numbers.row_numbers));
        assert_eq!(game.col_numbers, Some(numbers.col_numbers));
        assert_eq!(game.status, GameStatus::Locked);

        submit_quarter_score(&mut game, 1, score(7, 3)).unwrap();
        let before = (game.row_numbers, game.col_numbers);
        assert!(matches!(
            reshuffle_numbers(&mut game, &mut rng),
            Err(SquaresError::InvalidState(_))
        ));
        assert_eq!((game.row_numbers, game.col_numbers), before);
    }

    #[test]
    fn test_reshuffle_rejected_when_scores_exist_even_if_locked() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = locked_game();
        game.scores[0] = Some(score(3, 0));

        assert!(matches!(
            reshuffle_numbers(&mut game, &mut rng),
            Err(SquaresError::InvalidState(_))
        ));
    }

    #[test]
    fn test_winning_position_uses_last_digits() {
        let mut game = locked_game();
        assert_eq!(get_winning_position(&game, 1), None);

        submit_quarter_score(&mut game, 1, score(23, 17)).unwrap();
        // last digit 3 sits at row index 4, last digit 7 at column index 7
        assert_eq!(get_winning_position(&game, 1), Some(Position { row: 4, col: 7 }));
        assert_eq!(get_winning_position(&game, 2), None);
        assert_eq!(get_winning_position(&game, 0), None);
        assert_eq!(get_winning_position(&game, 5), None);
    }

    #[test]
    fn test_winning_position_requires_numbers() {
        let mut game = open_game();
        game.scores[0] = Some(score(10, 10));
        assert_eq!(get_winning_position(&game, 1), None);
    }

    #[test]
    fn test_winning_square_unclaimed_vs_pending() {
        let mut game = locked_game();
        let entries = vec![entry(&game, 4, 7, "Alice")];

        assert_eq!(get_winning_square(&game, 1, &entries), None);
        assert_eq!(resolve_quarter(&game, 1, &entries), QuarterOutcome::Pending);

        submit_quarter_score(&mut game, 1, score(23, 17)).unwrap();
        let win = get_winning_square(&game, 1, &entries).unwrap();
        assert_eq!((win.row, win.col), (4, 7));
        assert_eq!(win.entry.player_name, "Alice");

        submit_quarter_score(&mut game, 2, score(30, 20)).unwrap();
        // digit 0 -> row 3, digit 0 -> col 0, nobody there
        assert_eq!(get_winning_square(&game, 2, &entries), None);
        assert_eq!(
            resolve_quarter(&game, 2, &entries),
            QuarterOutcome::Unclaimed { row: 3, col: 0 }
        );
    }

    #[test]
    fn test_quarter_scores_monotonic() {
        let mut game = locked_game();
        assert_eq!(get_latest_quarter(&game), 0);

        let result = submit_quarter_score(&mut game, 2, score(7, 0));
        assert!(matches!(result, Err(SquaresError::InvalidState(_))));

        submit_quarter_score(&mut game, 1, score(7, 0)).unwrap();
        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!(get_latest_quarter(&game), 1);

        // Re-entering Q1 or skipping to Q3 are both rejected
        assert!(submit_quarter_score(&mut game, 1, score(7, 3)).is_err());
        assert!(submit_quarter_score(&mut game, 3, score(7, 3)).is_err());

        submit_quarter_score(&mut game, 2, score(14, 3)).unwrap();
        submit_quarter_score(&mut game, 3, score(17, 10)).unwrap();
        assert_eq!(game.status, GameStatus::InProgress);
        submit_quarter_score(&mut game, 4, score(24, 20)).unwrap();
        assert_eq!(game.status, GameStatus::Completed);
        assert_eq!(get_latest_quarter(&game), 4);

        assert!(submit_quarter_score(&mut game, 5, score(24, 20)).is_err());
    }

    #[test]
    fn test_scores_rejected_while_open() {
        let mut game = open_game();
        let result = submit_quarter_score(&mut game, 1, score(7, 0));
        assert!(matches!(result, Err(SquaresError::InvalidState(_))));
        assert_eq!(game.scores[0], None);
    }

    #[test]
    fn test_undo_quarter_score() {
        let mut game = locked_game();
        assert!(undo_quarter_score(&mut game).is_err());

        submit_quarter_score(&mut game, 1, score(7, 0)).unwrap();
        submit_quarter_score(&mut game, 2, score(14, 3)).unwrap();

        assert_eq!(undo_quarter_score(&mut game).unwrap(), 2);
        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!(undo_quarter_score(&mut game).unwrap(), 1);
        assert_eq!(game.status, GameStatus::Locked);
        assert_eq!(get_latest_quarter(&game), 0);
    }

    #[test]
    fn test_undo_from_completed() {
        let mut game = locked_game();
        for (q, s) in [(1, 3), (2, 10), (3, 13), (4, 20)] {
            submit_quarter_score(&mut game, q, score(s, s)).unwrap();
        }
        assert_eq!(game.status, GameStatus::Completed);
        assert_eq!(undo_quarter_score(&mut game).unwrap(), 4);
        assert_eq!(game.status, GameStatus::InProgress);
    }

    #[test]
    fn test_latest_quarter_stops_at_first_gap() {
        let mut game = locked_game();
        game.scores[0] = Some(score(1, 1));
        game.scores[2] = Some(score(3, 3));
        assert_eq!(get_latest_quarter(&game), 1);
    }

    #[test]
    fn test_quarter_results() {
        let mut game = locked_game();
        let entries = vec![entry(&game, 4, 7, "Alice")];
        assert!(quarter_results(&game, &entries).is_empty());

        submit_quarter_score(&mut game, 1, score(23, 17)).unwrap();
        submit_quarter_score(&mut game, 2, score(30, 20)).unwrap();

        let results = quarter_results(&game, &entries);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].quarter, 1);
        assert_eq!(
            results[0].entry.as_ref().map(|e| e.player_name.as_str()),
            Some("Alice")
        );
        assert_eq!(results[1].quarter, 2);
        assert_eq!((results[1].row, results[1].col), (3, 0));
        assert!(results[1].entry.is_none());
    }
}
