//! Shared utilities for two-player game implementations
//!
//! Games track the player to move as 1 (first player) or 2 (second player)
//! and the outcome as a winner code. These helpers convert between that
//! bookkeeping and the signed results exposed through [`crate::Game`].

/// Winner codes used by board implementations.
pub mod winner {
    pub const NONE: u8 = 0;
    pub const PLAYER1: u8 = 1;
    pub const PLAYER2: u8 = 2;
    pub const DRAW: u8 = 3;
}

/// Convert a result to the other player's perspective.
///
/// # Example
/// ```
/// use engine_core::game_utils::swap_result;
///
/// assert_eq!(swap_result(1.0), -1.0);
/// assert_eq!(swap_result(swap_result(0.5)), 0.5);
/// ```
#[inline]
pub fn swap_result(value: f32) -> f32 {
    -value
}

/// Signed result of a winner code from the first player's perspective.
///
/// Returns `None` while the game is ongoing.
///
/// # Example
/// ```
/// use engine_core::game_utils::{result_from_winner, winner};
///
/// assert_eq!(result_from_winner(winner::PLAYER1), Some(1.0));
/// assert_eq!(result_from_winner(winner::PLAYER2), Some(-1.0));
/// assert_eq!(result_from_winner(winner::DRAW), Some(0.0));
/// assert_eq!(result_from_winner(winner::NONE), None);
/// ```
#[inline]
pub fn result_from_winner(code: u8) -> Option<f32> {
    match code {
        winner::PLAYER1 => Some(1.0),
        winner::PLAYER2 => Some(-1.0),
        winner::DRAW => Some(0.0),
        _ => None,
    }
}

/// +1.0 for player 1, -1.0 for player 2.
#[inline]
pub fn player_sign(player: u8) -> f32 {
    if player == 1 {
        1.0
    } else {
        -1.0
    }
}

/// The other player (1 <-> 2).
#[inline]
pub fn opponent(player: u8) -> u8 {
    3 - player
}
