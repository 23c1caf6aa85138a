//! Core traits and types for the tinyzero game engine
//!
//! This crate provides the fundamental abstractions shared by every game and
//! by the search/training code:
//! - `Game`: object-safe trait over a live, mutable game instance with
//!   step/undo semantics
//! - `GameError`: rule violations surfaced by game implementations
//! - `game_utils`: helpers for two-player zero-sum result bookkeeping
//! - `Registry`: static registration system for games, keyed by env_id

pub mod game;
pub mod game_utils;
pub mod registry;

// Re-export main types for convenience
pub use game::{ActionId, Game, GameError};
pub use game_utils::swap_result;
pub use registry::{
    clear_registry, create_game, is_registered, list_registered_games, register_game, GameFactory,
};

/// Test utilities (internal use only)
#[cfg(test)]
pub(crate) mod test_utils {
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    /// Global mutex to serialize all registry-dependent tests
    pub static REGISTRY_TEST_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
}
