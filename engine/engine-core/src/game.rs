//! The game interface consumed by search, self-play and the arena.
//!
//! A `Game` is a single live, mutable position. Search explores by applying
//! `step` and restoring with `undo_last_action`, so implementations keep an
//! action history and must make `undo_last_action` the exact inverse of the
//! last `step`.
//!
//! Results follow two conventions:
//! - `result()` is from a fixed global perspective: +1 first player won,
//!   -1 second player won, 0 draw.
//! - `first_person_result()` is from the perspective of the player to move.

use rand_chacha::ChaCha20Rng;
use thiserror::Error;

use crate::game_utils;

/// Index of an action in `0..action_space_size()`.
pub type ActionId = usize;

/// Errors raised by game implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The action is outside the action space or not legal in this position.
    /// The position is left unchanged.
    #[error("illegal action {action}")]
    IllegalAction { action: ActionId },

    /// `undo_last_action` was called with no applied actions.
    #[error("no action to undo")]
    EmptyHistory,
}

/// A two-player, perfect-information, zero-sum game.
///
/// The trait is object safe; runtime selection goes through
/// [`crate::registry::create_game`], which hands out `Box<dyn Game>`.
pub trait Game: Send + std::fmt::Debug {
    /// Unique environment identifier (e.g. "connect4").
    fn env_id(&self) -> &'static str;

    /// Number of distinct action ids.
    fn action_space_size(&self) -> usize;

    /// Shape of the tensor returned by [`Game::to_observation`].
    fn observation_shape(&self) -> &'static [usize];

    /// Flattened observation length.
    fn observation_size(&self) -> usize {
        self.observation_shape().iter().product()
    }

    /// Upper bound on the number of plies in one game.
    fn max_game_length(&self) -> usize;

    /// Restore the starting position and clear the action history.
    fn reset(&mut self, rng: &mut ChaCha20Rng);

    /// Legal actions in ascending id order. Empty only when terminal.
    fn legal_actions(&self) -> Vec<ActionId>;

    /// Apply an action for the player to move.
    fn step(&mut self, action: ActionId) -> Result<(), GameError>;

    /// Revert the most recent `step`.
    fn undo_last_action(&mut self) -> Result<(), GameError>;

    /// Number of actions applied since `reset` that can still be undone.
    fn history_len(&self) -> usize;

    /// Flattened observation from the perspective of the player to move.
    fn to_observation(&self) -> Vec<f32>;

    /// Terminal outcome from the first player's perspective, `None` while
    /// the game is still running.
    fn result(&self) -> Option<f32>;

    /// +1.0 when the first player is to move, -1.0 otherwise.
    fn turn_sign(&self) -> f32;

    /// Terminal outcome from the perspective of the player to move.
    fn first_person_result(&self) -> Option<f32> {
        self.result().map(|r| r * self.turn_sign())
    }

    /// Convert a result to the opponent's perspective.
    fn swap_result(&self, value: f32) -> f32 {
        game_utils::swap_result(value)
    }

    fn is_terminal(&self) -> bool {
        self.result().is_some()
    }
}
