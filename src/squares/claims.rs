//! Claim admission and bulk fill
//!
//! Everything here is validate-then-return: a request is either accepted as a
//! whole set of new cells or rejected without producing any.

use std::collections::HashSet;

use super::error::{SquaresError, SquaresResult};
use super::players::{count_player_squares, get_unique_players, player_style};
use crate::types::{Cell, Entry, FillMode, Game, GameStatus, UserId, GRID_SIZE};

/// A cell assignment ready to be stored as an [`Entry`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub row_index: u8,
    pub col_index: u8,
    pub player_name: String,
    pub player_user_id: Option<UserId>,
    pub player_emoji: String,
    pub player_color: String,
}

impl NewEntry {
    pub fn cell(&self) -> Cell {
        Cell {
            row: self.row_index.into(),
            col: self.col_index.into(),
        }
    }
}

/// Whether a player holding `current` squares may take `requested` more
pub fn can_claim(max_squares_per_player: Option<u32>, current: usize, requested: usize) -> bool {
    match max_squares_per_player {
        None => true,
        Some(max) => current + requested <= max as usize,
    }
}

pub fn check_quota(
    entries: &[Entry],
    player_name: &str,
    requested: usize,
    max_squares_per_player: Option<u32>,
) -> SquaresResult<()> {
    let current = count_player_squares(entries, player_name);
    match max_squares_per_player {
        Some(max) if !can_claim(Some(max), current, requested) => {
            Err(SquaresError::QuotaExceeded {
                current,
                max,
                requested,
            })
        }
        _ => Ok(()),
    }
}

fn require_open(game: &Game, action: &str) -> SquaresResult<()> {
    if game.status != GameStatus::Open {
        return Err(SquaresError::InvalidState(format!(
            "cannot {} once the board is {}",
            action, game.status
        )));
    }
    Ok(())
}

/// Validate a multi-cell claim against the board
///
/// Checks run in order: board open, request non-empty, cells on the board,
/// no cell repeated within the request, no cell already taken, quota.
pub fn validate_claim(
    game: &Game,
    entries: &[Entry],
    player_name: &str,
    cells: &[Cell],
) -> SquaresResult<Vec<Cell>> {
    require_open(game, "claim squares")?;

    if cells.is_empty() {
        return Err(SquaresError::EmptyClaim);
    }

    if let Some(cell) = cells.iter().find(|c| !c.in_bounds()) {
        return Err(SquaresError::OutOfBounds(*cell));
    }

    let mut seen = HashSet::with_capacity(cells.len());
    for cell in cells {
        if !seen.insert(*cell) {
            return Err(SquaresError::DuplicateClaim(*cell));
        }
    }

    let taken = claimed_cells(entries);
    if let Some(cell) = cells.iter().find(|c| taken.contains(*c)) {
        return Err(SquaresError::DuplicateClaim(*cell));
    }

    check_quota(entries, player_name, cells.len(), game.max_squares_per_player)?;

    Ok(cells.to_vec())
}

/// Build the new entries for an admitted claim
pub fn plan_claim(
    game: &Game,
    entries: &[Entry],
    player_name: &str,
    player_user_id: Option<UserId>,
    cells: &[Cell],
) -> SquaresResult<Vec<NewEntry>> {
    let cells = validate_claim(game, entries, player_name, cells)?;
    let (emoji, color) = player_style(entries, player_name);

    cells
        .into_iter()
        .map(|cell| {
            let (row_index, col_index) = cell.indices().ok_or(SquaresError::OutOfBounds(cell))?;
            Ok(NewEntry {
                row_index,
                col_index,
                player_name: player_name.to_string(),
                player_user_id: player_user_id.clone(),
                player_emoji: emoji.clone(),
                player_color: color.clone(),
            })
        })
        .collect()
}

fn claimed_cells(entries: &[Entry]) -> HashSet<Cell> {
    entries.iter().map(Cell::from).collect()
}

fn empty_indices(entries: &[Entry]) -> Vec<(u8, u8)> {
    let mut taken = [[false; GRID_SIZE]; GRID_SIZE];
    for e in entries {
        taken[e.row_index as usize][e.col_index as usize] = true;
    }
    (0..GRID_SIZE as u8)
        .flat_map(|row| (0..GRID_SIZE as u8).map(move |col| (row, col)))
        .filter(|&(row, col)| !taken[row as usize][col as usize])
        .collect()
}

/// Unclaimed cells in row-major order
pub fn empty_cells(entries: &[Entry]) -> Vec<Cell> {
    empty_indices(entries)
        .into_iter()
        .map(|(row, col)| Cell {
            row: row.into(),
            col: col.into(),
        })
        .collect()
}

/// Assign every empty cell according to `mode`
pub fn plan_bulk_fill(
    game: &Game,
    entries: &[Entry],
    mode: &FillMode,
) -> SquaresResult<Vec<NewEntry>> {
    require_open(game, "fill the board")?;

    let empty = empty_indices(entries);

    match mode {
        FillMode::RoundRobin => {
            let players = get_unique_players(entries);
            if players.is_empty() {
                return Err(SquaresError::NoPlayers);
            }

            Ok(empty
                .into_iter()
                .zip(players.iter().cycle())
                .map(|((row_index, col_index), player)| NewEntry {
                    row_index,
                    col_index,
                    player_name: player.name.clone(),
                    player_user_id: entries
                        .iter()
                        .find(|e| e.player_name == player.name)
                        .and_then(|e| e.player_user_id.clone()),
                    player_emoji: player.emoji.clone(),
                    player_color: player.color.clone(),
                })
                .collect())
        }
        FillMode::House { name } => {
            let (emoji, color) = player_style(entries, name);
            Ok(empty
                .into_iter()
                .map(|(row_index, col_index)| NewEntry {
                    row_index,
                    col_index,
                    player_name: name.clone(),
                    player_user_id: None,
                    player_emoji: emoji.clone(),
                    player_color: color.clone(),
                })
                .collect())
        }
    }
}
