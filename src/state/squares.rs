use super::{AppState, Board};
use crate::api::ApiError;
use crate::squares::{self, BoardNumbers, NewEntry};
use crate::types::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Safe character set for share codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

const MAX_NAME_CHARS: usize = 40;

fn generate_share_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

fn validate_name(value: &str, what: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{} cannot be empty", what)));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "{} must be at most {} characters",
            what, MAX_NAME_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameInput {
    pub team_a_name: String,
    pub team_b_name: String,
    #[serde(default)]
    pub max_squares_per_player: Option<u32>,
    #[serde(default)]
    pub entry_fee: u32,
}

/// Everything a client needs to render a board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
    pub game: Game,
    pub entries: Vec<Entry>,
    pub players: Vec<PlayerSummary>,
    pub results: Vec<WinningResult>,
    pub latest_quarter: u8,
    pub claimed: usize,
    pub is_full: bool,
}

impl From<&Board> for BoardView {
    fn from(board: &Board) -> Self {
        Self {
            game: board.game.clone(),
            entries: board.entries.clone(),
            players: squares::get_unique_players(&board.entries),
            results: squares::quarter_results(&board.game, &board.entries),
            latest_quarter: squares::get_latest_quarter(&board.game),
            claimed: squares::count_claimed(&board.entries),
            is_full: squares::is_board_full(&board.entries),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Game not found".to_string())
}

fn store_entries(board: &mut Board, planned: Vec<NewEntry>) -> Vec<Entry> {
    let created: Vec<Entry> = planned
        .into_iter()
        .map(|p| Entry {
            id: ulid::Ulid::new().to_string(),
            game_id: board.game.id.clone(),
            row_index: p.row_index,
            col_index: p.col_index,
            player_name: p.player_name,
            player_user_id: p.player_user_id,
            player_emoji: p.player_emoji,
            player_color: p.player_color,
        })
        .collect();
    board.entries.extend(created.iter().cloned());
    created
}

fn draw_lock(game: &mut Game) -> squares::SquaresResult<BoardNumbers> {
    squares::lock_board(game, &mut rand::rng())
}

fn draw_reshuffle(game: &mut Game) -> squares::SquaresResult<BoardNumbers> {
    squares::reshuffle_numbers(game, &mut rand::rng())
}

impl AppState {
    /// Create a new open board owned by `created_by`
    pub async fn create_game(
        &self,
        created_by: &UserId,
        input: CreateGameInput,
    ) -> Result<Game, ApiError> {
        let team_a_name = validate_name(&input.team_a_name, "Team A name")?;
        let team_b_name = validate_name(&input.team_b_name, "Team B name")?;
        if let Some(max) = input.max_squares_per_player {
            if max == 0 || max as usize > GRID_SIZE * GRID_SIZE {
                return Err(ApiError::BadRequest(format!(
                    "max_squares_per_player must be between 1 and {}",
                    GRID_SIZE * GRID_SIZE
                )));
            }
        }

        let mut boards = self.boards.write().await;

        // Unique share code (collisions are rare with 28M combinations)
        let share_code = loop {
            let code = generate_share_code();
            if !boards.values().any(|b| b.game.share_code == code) {
                break code;
            }
        };

        let game = Game {
            id: ulid::Ulid::new().to_string(),
            team_a_name,
            team_b_name,
            grid_size: GRID_SIZE,
            status: GameStatus::Open,
            row_numbers: None,
            col_numbers: None,
            scores: [None; QUARTERS],
            max_squares_per_player: input.max_squares_per_player,
            created_by: created_by.clone(),
            share_code,
            entry_fee: input.entry_fee,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        boards.insert(
            game.id.clone(),
            Board {
                game: game.clone(),
                entries: Vec::new(),
            },
        );

        tracing::info!(game_id = %game.id, share_code = %game.share_code, "Created squares game");
        Ok(game)
    }

    pub async fn get_game(&self, game_id: &GameId) -> Option<Game> {
        self.boards
            .read()
            .await
            .get(game_id)
            .map(|b| b.game.clone())
    }

    pub async fn get_game_by_share_code(&self, share_code: &str) -> Option<Game> {
        let code = share_code.trim().to_uppercase();
        self.boards
            .read()
            .await
            .values()
            .find(|b| b.game.share_code == code)
            .map(|b| b.game.clone())
    }

    pub async fn get_board(&self, game_id: &GameId) -> Option<BoardView> {
        self.boards.read().await.get(game_id).map(BoardView::from)
    }

    /// Entries for a game in claim order
    pub async fn list_entries(&self, game_id: &GameId) -> Vec<Entry> {
        self.boards
            .read()
            .await
            .get(game_id)
            .map(|b| b.entries.clone())
            .unwrap_or_default()
    }

    /// Claim cells for a player; all of them are stored or none
    pub async fn claim_squares(
        &self,
        game_id: &GameId,
        player_name: &str,
        player_user_id: Option<UserId>,
        cells: &[Cell],
    ) -> Result<Vec<Entry>, ApiError> {
        let player_name = validate_name(player_name, "Player name")?;

        let mut boards = self.boards.write().await;
        let board = boards.get_mut(game_id).ok_or_else(not_found)?;

        let planned = squares::plan_claim(
            &board.game,
            &board.entries,
            &player_name,
            player_user_id,
            cells,
        )?;
        let created = store_entries(board, planned);

        tracing::info!(
            game_id = %game_id,
            player = %player_name,
            count = created.len(),
            "Squares claimed"
        );
        Ok(created)
    }

    /// Remove a claim while the board is still open
    pub async fn remove_entry(
        &self,
        game_id: &GameId,
        entry_id: &EntryId,
    ) -> Result<Entry, ApiError> {
        let mut boards = self.boards.write().await;
        let board = boards.get_mut(game_id).ok_or_else(not_found)?;

        if board.game.status != GameStatus::Open {
            return Err(squares::SquaresError::InvalidState(format!(
                "entries can only be removed while open (status: {})",
                board.game.status
            ))
            .into());
        }

        let pos = board
            .entries
            .iter()
            .position(|e| &e.id == entry_id)
            .ok_or_else(|| ApiError::NotFound("Entry not found".to_string()))?;
        let removed = board.entries.remove(pos);

        tracing::info!(game_id = %game_id, entry_id = %entry_id, "Removed squares entry");
        Ok(removed)
    }

    pub async fn lock_game(&self, game_id: &GameId) -> Result<BoardNumbers, ApiError> {
        let mut boards = self.boards.write().await;
        let board = boards.get_mut(game_id).ok_or_else(not_found)?;

        let numbers = draw_lock(&mut board.game)?;
        tracing::info!(
            game_id = %game_id,
            rows = ?numbers.row_numbers,
            cols = ?numbers.col_numbers,
            "Board locked"
        );
        Ok(numbers)
    }

    pub async fn reshuffle_game(&self, game_id: &GameId) -> Result<BoardNumbers, ApiError> {
        let mut boards = self.boards.write().await;
        let board = boards.get_mut(game_id).ok_or_else(not_found)?;

        let numbers = draw_reshuffle(&mut board.game)?;
        tracing::info!(
            game_id = %game_id,
            rows = ?numbers.row_numbers,
            cols = ?numbers.col_numbers,
            "Board numbers reshuffled"
        );
        Ok(numbers)
    }

    /// Record a quarter score and report that quarter's result
    pub async fn submit_quarter_score(
        &self,
        game_id: &GameId,
        quarter: u8,
        score: QuarterScore,
    ) -> Result<WinningResult, ApiError> {
        let mut boards = self.boards.write().await;
        let board = boards.get_mut(game_id).ok_or_else(not_found)?;

        squares::submit_quarter_score(&mut board.game, quarter, score)?;

        let result = squares::quarter_results(&board.game, &board.entries)
            .into_iter()
            .find(|r| r.quarter == quarter)
            .ok_or_else(|| {
                ApiError::Conflict(format!("Quarter {} could not be resolved", quarter))
            })?;

        tracing::info!(
            game_id = %game_id,
            quarter,
            team_a = score.team_a,
            team_b = score.team_b,
            winner = ?result.entry.as_ref().map(|e| &e.player_name),
            "Quarter score recorded"
        );
        Ok(result)
    }

    /// Clear the most recent quarter score; returns the cleared quarter
    pub async fn undo_quarter_score(&self, game_id: &GameId) -> Result<u8, ApiError> {
        let mut boards = self.boards.write().await;
        let board = boards.get_mut(game_id).ok_or_else(not_found)?;

        let quarter = squares::undo_quarter_score(&mut board.game)?;
        tracing::info!(game_id = %game_id, quarter, "Quarter score cleared");
        Ok(quarter)
    }

    /// Fill every empty cell; returns the new entries
    pub async fn bulk_fill(
        &self,
        game_id: &GameId,
        mode: FillMode,
    ) -> Result<Vec<Entry>, ApiError> {
        let mode = match mode {
            FillMode::House { name } => FillMode::House {
                name: validate_name(&name, "House name")?,
            },
            FillMode::RoundRobin => FillMode::RoundRobin,
        };

        let mut boards = self.boards.write().await;
        let board = boards.get_mut(game_id).ok_or_else(not_found)?;

        let planned = squares::plan_bulk_fill(&board.game, &board.entries, &mode)?;
        let created = store_entries(board, planned);

        tracing::info!(
            game_id = %game_id,
            mode = ?mode,
            count = created.len(),
            "Board bulk-filled"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squares::SquaresError;

    fn input() -> CreateGameInput {
        CreateGameInput {
            team_a_name: "Chiefs".to_string(),
            team_b_name: "Eagles".to_string(),
            max_squares_per_player: None,
            entry_fee: 5,
        }
    }

    fn cell(row: i64, col: i64) -> Cell {
        Cell { row, col }
    }

    #[tokio::test]
    async fn test_create_game() {
        let state = AppState::new();
        let game = state
            .create_game(&"creator".to_string(), input())
            .await
            .unwrap();

        assert_eq!(game.status, GameStatus::Open);
        assert_eq!(game.grid_size, 10);
        assert!(game.row_numbers.is_none());
        assert_eq!(game.share_code.len(), 5);
        assert!(game
            .share_code
            .bytes()
            .all(|b| CODE_CHARS.contains(&b)));

        let by_code = state
            .get_game_by_share_code(&game.share_code.to_lowercase())
            .await;
        assert_eq!(by_code.map(|g| g.id), Some(game.id));
    }

    #[tokio::test]
    async fn test_create_game_validates_input() {
        let state = AppState::new();
        let mut bad = input();
        bad.team_a_name = "   ".to_string();
        assert!(matches!(
            state.create_game(&"c".to_string(), bad).await,
            Err(ApiError::BadRequest(_))
        ));

        let mut bad = input();
        bad.max_squares_per_player = Some(0);
        assert!(matches!(
            state.create_game(&"c".to_string(), bad).await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_claim_is_all_or_nothing() {
        let state = AppState::new();
        let game = state.create_game(&"c".to_string(), input()).await.unwrap();

        state
            .claim_squares(&game.id, "Bob", None, &[cell(1, 1)])
            .await
            .unwrap();

        let result = state
            .claim_squares(&game.id, "Alice", None, &[cell(0, 0), cell(1, 1)])
            .await;
        assert!(matches!(
            result,
            Err(ApiError::Squares(SquaresError::DuplicateClaim(_)))
        ));

        let entries = state.list_entries(&game.id).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_name, "Bob");
    }

    #[tokio::test]
    async fn test_claim_quota() {
        let state = AppState::new();
        let mut create = input();
        create.max_squares_per_player = Some(3);
        let game = state.create_game(&"c".to_string(), create).await.unwrap();

        state
            .claim_squares(&game.id, "Alice", None, &[cell(0, 0), cell(0, 1)])
            .await
            .unwrap();

        let err = state
            .claim_squares(&game.id, "Alice", None, &[cell(0, 2), cell(0, 3)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Squares(SquaresError::QuotaExceeded {
                current: 2,
                max: 3,
                ..
            })
        ));

        let created = state
            .claim_squares(&game.id, "Alice", None, &[cell(0, 2)])
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(state.list_entries(&game.id).await.len(), 3);
    }

    #[tokio::test]
    async fn test_claim_unknown_game() {
        let state = AppState::new();
        let result = state
            .claim_squares(&"nope".to_string(), "Alice", None, &[cell(0, 0)])
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lock_freezes_claims_and_entries() {
        let state = AppState::new();
        let game = state.create_game(&"c".to_string(), input()).await.unwrap();
        let entry = state
            .claim_squares(&game.id, "Alice", None, &[cell(4, 4)])
            .await
            .unwrap()
            .remove(0);

        state.lock_game(&game.id).await.unwrap();

        // Second lock loses
        assert!(matches!(
            state.lock_game(&game.id).await,
            Err(ApiError::Squares(SquaresError::InvalidState(_)))
        ));

        assert!(state
            .claim_squares(&game.id, "Bob", None, &[cell(5, 5)])
            .await
            .is_err());
        assert!(state.remove_entry(&game.id, &entry.id).await.is_err());
        assert_eq!(state.list_entries(&game.id).await, vec![entry]);
    }

    #[tokio::test]
    async fn test_concurrent_locks_only_one_wins() {
        let state = AppState::new();
        let game = state.create_game(&"c".to_string(), input()).await.unwrap();

        let (a, b) = tokio::join!(state.lock_game(&game.id), state.lock_game(&game.id));
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

        let winner = a.or(b).unwrap();
        let stored = state.get_game(&game.id).await.unwrap();
        assert_eq!(stored.row_numbers, Some(winner.row_numbers));
        assert_eq!(stored.col_numbers, Some(winner.col_numbers));
    }

    #[tokio::test]
    async fn test_remove_entry_while_open() {
        let state = AppState::new();
        let game = state.create_game(&"c".to_string(), input()).await.unwrap();
        let created = state
            .claim_squares(&game.id, "Alice", None, &[cell(0, 0), cell(0, 1)])
            .await
            .unwrap();

        let removed = state.remove_entry(&game.id, &created[0].id).await.unwrap();
        assert_eq!(removed.id, created[0].id);
        assert_eq!(state.list_entries(&game.id).await.len(), 1);

        assert!(matches!(
            state.remove_entry(&game.id, &created[0].id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_score_flow_reports_winner() {
        let state = AppState::new();
        let game = state.create_game(&"c".to_string(), input()).await.unwrap();
        state
            .claim_squares(&game.id, "Alice", None, &[cell(0, 0)])
            .await
            .unwrap();
        state
            .bulk_fill(
                &game.id,
                FillMode::House {
                    name: "House".to_string(),
                },
            )
            .await
            .unwrap();
        let numbers = state.lock_game(&game.id).await.unwrap();

        // Aim Q1 at Alice's square (0, 0)
        let score = QuarterScore {
            team_a: 10 + numbers.row_numbers[0] as u32,
            team_b: 20 + numbers.col_numbers[0] as u32,
        };
        let result = state.submit_quarter_score(&game.id, 1, score).await.unwrap();
        assert_eq!((result.row, result.col), (0, 0));
        assert_eq!(result.entry.map(|e| e.player_name), Some("Alice".to_string()));

        // Reshuffle is closed once a score exists
        assert!(state.reshuffle_game(&game.id).await.is_err());

        let board = state.get_board(&game.id).await.unwrap();
        assert_eq!(board.game.status, GameStatus::InProgress);
        assert_eq!(board.latest_quarter, 1);
        assert!(board.is_full);
        assert_eq!(board.results.len(), 1);

        assert_eq!(state.undo_quarter_score(&game.id).await.unwrap(), 1);
        assert_eq!(
            state.get_game(&game.id).await.unwrap().status,
            GameStatus::Locked
        );
        assert!(state.reshuffle_game(&game.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_house_fill_uses_trimmed_name() {
        let state = AppState::new();
        let game = state.create_game(&"c".to_string(), input()).await.unwrap();
        state
            .claim_squares(&game.id, "House", None, &[cell(0, 0)])
            .await
            .unwrap();

        let created = state
            .bulk_fill(
                &game.id,
                FillMode::House {
                    name: "  House  ".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.len(), 99);
        assert!(created.iter().all(|e| e.player_name == "House"));

        let board = state.get_board(&game.id).await.unwrap();
        assert_eq!(board.players.len(), 1);
        assert_eq!(board.players[0].count, 100);

        assert!(matches!(
            state
                .bulk_fill(&game.id, FillMode::House { name: " ".to_string() })
                .await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_round_robin_fill_from_state() {
        let state = AppState::new();
        let game = state.create_game(&"c".to_string(), input()).await.unwrap();

        assert!(matches!(
            state.bulk_fill(&game.id, FillMode::RoundRobin).await,
            Err(ApiError::Squares(SquaresError::NoPlayers))
        ));

        state
            .claim_squares(&game.id, "Alice", Some("u-alice".to_string()), &[cell(9, 9)])
            .await
            .unwrap();
        state
            .claim_squares(&game.id, "Bob", None, &[cell(9, 8)])
            .await
            .unwrap();

        let created = state.bulk_fill(&game.id, FillMode::RoundRobin).await.unwrap();
        assert_eq!(created.len(), 98);
        assert!(created
            .iter()
            .filter(|e| e.player_name == "Alice")
            .all(|e| e.player_user_id.as_deref() == Some("u-alice")));

        let board = state.get_board(&game.id).await.unwrap();
        assert!(board.is_full);
        assert_eq!(board.players.len(), 2);
        assert_eq!(board.players[0].count, 50);
        assert_eq!(board.players[1].count, 50);
    }
}
