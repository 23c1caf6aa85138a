//! Static game registry for runtime game selection
//!
//! This module provides a thread-safe registry that maps an env_id to a
//! factory producing a fresh `Box<dyn Game>`. Game crates expose a
//! `register_*` function and `engine-games` calls all of them once.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::game::Game;

/// Factory function type for creating game instances
pub type GameFactory = fn() -> Box<dyn Game>;

/// Thread-safe registry mapping env_id to game factory functions
static REGISTRY: Lazy<Mutex<HashMap<String, GameFactory>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

// A panic while holding the lock cannot leave the map half-written, so a
// poisoned registry is still usable.
fn registry() -> MutexGuard<'static, HashMap<String, GameFactory>> {
    REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register a game with the global registry
///
/// Registering the same env_id twice replaces the earlier factory.
///
/// # Arguments
///
/// * `env_id` - Unique environment identifier (e.g., "connect4")
/// * `factory` - Function that creates new instances of the game
pub fn register_game(env_id: String, factory: GameFactory) {
    let mut registry = registry();
    if registry.contains_key(&env_id) {
        warn!(env_id = %env_id, "Overriding existing game registration");
    }
    registry.insert(env_id, factory);
}

/// Create a new game instance by env_id
///
/// Returns `Some(game)` if the env_id is registered, `None` otherwise.
pub fn create_game(env_id: &str) -> Option<Box<dyn Game>> {
    let registry = registry();
    match registry.get(env_id) {
        Some(factory) => Some(factory()),
        None => {
            warn!(env_id = %env_id, "Attempted to create unregistered game");
            None
        }
    }
}

/// Get a sorted list of all registered environment IDs
pub fn list_registered_games() -> Vec<String> {
    let mut games: Vec<String> = registry().keys().cloned().collect();
    games.sort();
    games
}

/// Check if a game is registered
pub fn is_registered(env_id: &str) -> bool {
    registry().contains_key(env_id)
}

/// Clear all registered games (mainly for testing)
pub fn clear_registry() {
    registry().clear();
}

/// Convenience macro for registering a `Default`-constructible game
///
/// # Example
///
/// ```ignore
/// register_game!(Connect4, "connect4");
/// ```
#[macro_export]
macro_rules! register_game {
    ($game_type:ty, $env_id:expr) => {{
        fn factory() -> Box<dyn $crate::game::Game> {
            Box::new(<$game_type>::default())
        }
        $crate::registry::register_game($env_id.to_string(), factory);
    }};
}
