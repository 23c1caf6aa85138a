//! Game registration for the tinyzero engine
//!
//! Single initialization point that registers every bundled game with the
//! engine-core registry, so binaries can pick a game by env_id at runtime.
//!
//! # Usage
//!
//! ```rust
//! use engine_games::register_all_games;
//!
//! register_all_games();
//! let game = engine_core::create_game("pylos").unwrap();
//! assert_eq!(game.action_space_size(), 30);
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Register all available games with the engine-core registry.
///
/// Registration happens once per process no matter how often this is
/// called.
///
/// Currently registers:
/// - Connect 4 (`"connect4"`)
/// - Pylos (`"pylos"`)
pub fn register_all_games() {
    INIT.call_once(|| {
        games_connect4::register_connect4();
        games_pylos::register_pylos();
    });
}

pub use games_connect4::register_connect4;
pub use games_pylos::register_pylos;
