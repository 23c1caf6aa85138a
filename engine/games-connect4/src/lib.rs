//! Connect 4 game implementation for the tinyzero engine
//!
//! Connect 4 is a two-player connection game where players drop colored discs
//! into a 7-column, 6-row vertically suspended grid. The objective is to be
//! the first to form a horizontal, vertical, or diagonal line of four discs.
//!
//! # Board Layout
//!
//! The board is stored in row-major order, with row 0 at the bottom:
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! Row 4: [28][29][30][31][32][33][34]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! # Observation
//!
//! Three 6x7 planes from the perspective of the player to move, in the same
//! cell order as the board: own discs, opponent discs, empty cells.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::Game;
//! use games_connect4::Connect4;
//!
//! let mut game = Connect4::new();
//! game.step(3).unwrap();
//! assert_eq!(game.legal_actions().len(), 7);
//! game.undo_last_action().unwrap();
//! assert_eq!(game.history_len(), 0);
//! ```

use engine_core::game_utils::{opponent, player_sign, result_from_winner, winner};
use engine_core::{register_game, ActionId, Game, GameError};
use rand_chacha::ChaCha20Rng;

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Observation planes: own, opponent, empty
pub const OBS_PLANES: usize = 3;
const OBS_SHAPE: [usize; 3] = [OBS_PLANES, ROWS, COLS];

/// Register Connect4 with the global game registry
///
/// Call this function once at startup to make Connect4 available
/// via `engine_core::create_game("connect4")`.
pub fn register_connect4() {
    register_game("connect4".to_string(), || Box::new(Connect4::new()));
}

/// Connect4 game
///
/// Holds the live position and the stack of played columns used by
/// `undo_last_action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect4 {
    /// Board representation: 0=empty, 1=Red (player 1), 2=Yellow (player 2)
    /// Stored in row-major order with row 0 at the bottom
    board: [u8; BOARD_SIZE],
    /// Player to move: 1=Red, 2=Yellow
    current_player: u8,
    /// Winner: 0=none/ongoing, 1=Red, 2=Yellow, 3=draw
    winner: u8,
    /// Height of each column (0-6 means number of pieces in column)
    column_heights: [u8; COLS],
    /// Columns played so far, oldest first
    history: Vec<u8>,
}

impl Connect4 {
    /// Create a new game at the starting position
    pub fn new() -> Self {
        Self {
            board: [0; BOARD_SIZE],
            current_player: 1, // Red goes first
            winner: winner::NONE,
            column_heights: [0; COLS],
            history: Vec::with_capacity(BOARD_SIZE),
        }
    }

    /// Convert column and row to board index
    #[inline]
    pub fn pos(col: usize, row: usize) -> usize {
        row * COLS + col
    }

    /// Cell contents at (col, row): 0=empty, 1=Red, 2=Yellow
    pub fn cell(&self, col: usize, row: usize) -> u8 {
        self.board[Self::pos(col, row)]
    }

    /// Player to move (1 or 2)
    pub fn current_player(&self) -> u8 {
        self.current_player
    }

    /// Winner code (see `engine_core::game_utils::winner`)
    pub fn winner(&self) -> u8 {
        self.winner
    }

    /// Bit-mask of columns that can still take a disc.
    pub fn legal_moves_mask(&self) -> u8 {
        if self.winner != winner::NONE {
            return 0;
        }

        self.column_heights
            .iter()
            .enumerate()
            .fold(0u8, |mask, (col, &height)| {
                if height < ROWS as u8 {
                    mask | (1u8 << col)
                } else {
                    mask
                }
            })
    }

    /// Check if the piece at (col, row) creates a winning line
    fn check_winner_at(&self, col: usize, row: usize) -> u8 {
        let player = self.board[Self::pos(col, row)];
        if player == 0 {
            return winner::NONE;
        }

        // Direction vectors: horizontal, vertical, diagonal /, diagonal \
        let directions: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

        for (dc, dr) in directions {
            let count = 1
                + self.run_length(col, row, dc, dr, player)
                + self.run_length(col, row, -dc, -dr, player);
            if count >= 4 {
                return player;
            }
        }

        if self.column_heights.iter().all(|&h| h >= ROWS as u8) {
            return winner::DRAW;
        }

        winner::NONE
    }

    /// Count consecutive `player` discs starting next to (col, row).
    fn run_length(&self, col: usize, row: usize, dc: i32, dr: i32, player: u8) -> usize {
        let mut count = 0;
        let (mut c, mut r) = (col as i32 + dc, row as i32 + dr);
        while c >= 0 && c < COLS as i32 && r >= 0 && r < ROWS as i32 {
            if self.board[Self::pos(c as usize, r as usize)] != player {
                break;
            }
            count += 1;
            c += dc;
            r += dr;
        }
        count
    }
}

impl Default for Connect4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Connect4 {
    fn env_id(&self) -> &'static str {
        "connect4"
    }

    fn action_space_size(&self) -> usize {
        COLS
    }

    fn observation_shape(&self) -> &'static [usize] {
        &OBS_SHAPE
    }

    fn max_game_length(&self) -> usize {
        BOARD_SIZE
    }

    fn reset(&mut self, _rng: &mut ChaCha20Rng) {
        *self = Self::new();
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        let mask = self.legal_moves_mask();
        (0..COLS).filter(|&col| mask & (1u8 << col) != 0).collect()
    }

    fn step(&mut self, action: ActionId) -> Result<(), GameError> {
        if action >= COLS || self.legal_moves_mask() & (1u8 << action) == 0 {
            return Err(GameError::IllegalAction { action });
        }

        let row = self.column_heights[action] as usize;
        self.board[Self::pos(action, row)] = self.current_player;
        self.column_heights[action] += 1;
        self.history.push(action as u8);

        self.winner = self.check_winner_at(action, row);
        self.current_player = opponent(self.current_player);
        Ok(())
    }

    fn undo_last_action(&mut self) -> Result<(), GameError> {
        let col = self.history.pop().ok_or(GameError::EmptyHistory)? as usize;

        self.column_heights[col] -= 1;
        let row = self.column_heights[col] as usize;
        self.board[Self::pos(col, row)] = 0;

        // No step is allowed from a finished position, so the previous
        // position was always ongoing.
        self.winner = winner::NONE;
        self.current_player = opponent(self.current_player);
        Ok(())
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn to_observation(&self) -> Vec<f32> {
        let mut obs = vec![0.0; OBS_PLANES * BOARD_SIZE];
        let me = self.current_player;

        for (i, &cell) in self.board.iter().enumerate() {
            let plane = match cell {
                0 => 2,
                c if c == me => 0,
                _ => 1,
            };
            obs[plane * BOARD_SIZE + i] = 1.0;
        }

        obs
    }

    fn result(&self) -> Option<f32> {
        result_from_winner(self.winner)
    }

    fn turn_sign(&self) -> f32 {
        player_sign(self.current_player)
    }
}

#[cfg(test)]
mod tests;
