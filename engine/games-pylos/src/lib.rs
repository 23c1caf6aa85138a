//! Pylos (placement variant) for the tinyzero engine
//!
//! Two players stack balls on a square pyramid of four levels (4x4, 3x3,
//! 2x2, 1x1). A ball can be placed on an empty cell of level 0, or on a cell
//! of a higher level once the 2x2 square of cells beneath it is filled. Each
//! player starts with 15 balls in reserve.
//!
//! The game ends when the apex is filled (its owner wins) or when the player
//! to move has no legal placement (that player loses).
//!
//! # Layout
//!
//! The pyramid is stored as a flat array of 30 cells, level by level, each
//! level in row-major order. The action id of a placement is its cell index:
//! ```text
//! Level 0: ids  0..16  (4x4)
//! Level 1: ids 16..25  (3x3)
//! Level 2: ids 25..29  (2x2)
//! Level 3: id  29      (apex)
//! ```
//!
//! # Observation
//!
//! 30 floats, one per cell: +1 for the mover's balls, -1 for the opponent's,
//! 0 for empty cells.

use engine_core::game_utils::swap_result;
use engine_core::{register_game, ActionId, Game, GameError};
use once_cell::sync::Lazy;
use rand_chacha::ChaCha20Rng;

/// Side length of each level, bottom first
pub const LEVEL_SIZES: [usize; 4] = [4, 3, 2, 1];

/// Total number of cells (and placement actions)
pub const NUM_CELLS: usize = 30;

/// Balls each player starts with
pub const RESERVE: u8 = 15;

const APEX: usize = NUM_CELLS - 1;
const OBS_SHAPE: [usize; 1] = [NUM_CELLS];

/// Position of a cell in the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coord {
    pub level: usize,
    pub row: usize,
    pub col: usize,
}

/// Read-only cell geometry shared by every game instance.
struct Layout {
    coords: Vec<Coord>,
    /// First cell index of each level
    offsets: [usize; 4],
    /// The four cells a ball rests on (none for level 0)
    supports: Vec<Option<[usize; 4]>>,
}

static LAYOUT: Lazy<Layout> = Lazy::new(|| {
    let mut coords = Vec::with_capacity(NUM_CELLS);
    let mut offsets = [0; 4];
    for (level, &size) in LEVEL_SIZES.iter().enumerate() {
        offsets[level] = coords.len();
        for row in 0..size {
            for col in 0..size {
                coords.push(Coord { level, row, col });
            }
        }
    }

    let index = |level: usize, row: usize, col: usize| {
        offsets[level] + row * LEVEL_SIZES[level] + col
    };
    let supports = coords
        .iter()
        .map(|c| {
            (c.level > 0).then(|| {
                let below = c.level - 1;
                [
                    index(below, c.row, c.col),
                    index(below, c.row + 1, c.col),
                    index(below, c.row, c.col + 1),
                    index(below, c.row + 1, c.col + 1),
                ]
            })
        })
        .collect();

    Layout {
        coords,
        offsets,
        supports,
    }
});

/// Action id of the cell at (level, row, col).
///
/// Returns `None` when the coordinates are outside the pyramid.
pub fn action_for(level: usize, row: usize, col: usize) -> Option<ActionId> {
    let size = *LEVEL_SIZES.get(level)?;
    if row >= size || col >= size {
        return None;
    }
    Some(LAYOUT.offsets[level] + row * size + col)
}

/// Coordinates of an action id.
pub fn coord_of(action: ActionId) -> Option<Coord> {
    LAYOUT.coords.get(action).copied()
}

/// Register Pylos with the global game registry
pub fn register_pylos() {
    register_game("pylos".to_string(), || Box::new(Pylos::new()));
}

/// Pylos game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pylos {
    /// +1 white (first player), -1 black, 0 empty
    cells: [i8; NUM_CELLS],
    /// +1 when white is to move, -1 when black is
    turn: i8,
    /// Balls left in reserve: [white, black]
    reserves: [u8; 2],
    /// Cells filled so far, oldest first
    history: Vec<u8>,
}

impl Pylos {
    pub fn new() -> Self {
        Self {
            cells: [0; NUM_CELLS],
            turn: 1,
            reserves: [RESERVE; 2],
            history: Vec::with_capacity(NUM_CELLS),
        }
    }

    #[inline]
    fn reserve_slot(player: i8) -> usize {
        if player == 1 {
            0
        } else {
            1
        }
    }

    /// Balls left in reserve for `player` (+1 white, -1 black).
    pub fn reserve(&self, player: i8) -> u8 {
        self.reserves[Self::reserve_slot(player)]
    }

    /// Owner of a cell: +1, -1 or 0.
    pub fn cell(&self, action: ActionId) -> i8 {
        self.cells[action]
    }

    fn is_supported(&self, cell: usize) -> bool {
        match LAYOUT.supports[cell] {
            None => true,
            Some(below) => below.iter().all(|&b| self.cells[b] != 0),
        }
    }

    fn can_place(&self, cell: usize) -> bool {
        self.cells[cell] == 0 && self.is_supported(cell)
    }
}

impl Default for Pylos {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Pylos {
    fn env_id(&self) -> &'static str {
        "pylos"
    }

    fn action_space_size(&self) -> usize {
        NUM_CELLS
    }

    fn observation_shape(&self) -> &'static [usize] {
        &OBS_SHAPE
    }

    fn max_game_length(&self) -> usize {
        NUM_CELLS
    }

    fn reset(&mut self, _rng: &mut ChaCha20Rng) {
        *self = Self::new();
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        if self.cells[APEX] != 0 || self.reserve(self.turn) == 0 {
            return Vec::new();
        }
        (0..NUM_CELLS).filter(|&cell| self.can_place(cell)).collect()
    }

    fn step(&mut self, action: ActionId) -> Result<(), GameError> {
        if action >= NUM_CELLS
            || self.cells[APEX] != 0
            || self.reserve(self.turn) == 0
            || !self.can_place(action)
        {
            return Err(GameError::IllegalAction { action });
        }

        self.cells[action] = self.turn;
        self.reserves[Self::reserve_slot(self.turn)] -= 1;
        self.history.push(action as u8);
        self.turn = -self.turn;
        Ok(())
    }

    fn undo_last_action(&mut self) -> Result<(), GameError> {
        let cell = self.history.pop().ok_or(GameError::EmptyHistory)? as usize;
        self.turn = -self.turn;
        self.cells[cell] = 0;
        self.reserves[Self::reserve_slot(self.turn)] += 1;
        Ok(())
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn to_observation(&self) -> Vec<f32> {
        self.cells
            .iter()
            .map(|&c| (c * self.turn) as f32)
            .collect()
    }

    fn result(&self) -> Option<f32> {
        if self.cells[APEX] != 0 {
            return Some(self.cells[APEX] as f32);
        }
        if self.legal_actions().is_empty() {
            // The player to move is stuck and loses.
            return Some(swap_result(self.turn_sign()));
        }
        None
    }

    fn turn_sign(&self) -> f32 {
        self.turn as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_layout_table() {
        assert_eq!(LAYOUT.coords.len(), NUM_CELLS);
        assert_eq!(action_for(0, 0, 0), Some(0));
        assert_eq!(action_for(0, 3, 3), Some(15));
        assert_eq!(action_for(1, 0, 0), Some(16));
        assert_eq!(action_for(2, 1, 1), Some(28));
        assert_eq!(action_for(3, 0, 0), Some(APEX));
        assert_eq!(action_for(3, 0, 1), None);
        assert_eq!(action_for(4, 0, 0), None);

        for action in 0..NUM_CELLS {
            let c = coord_of(action).unwrap();
            assert_eq!(action_for(c.level, c.row, c.col), Some(action));
        }
        assert_eq!(coord_of(NUM_CELLS), None);
    }

    #[test]
    fn test_initial_legal_actions_are_ground_level() {
        let game = Pylos::new();
        assert_eq!(game.legal_actions(), (0..16).collect::<Vec<_>>());
        assert_eq!(game.result(), None);
        assert_eq!(game.turn_sign(), 1.0);
    }

    #[test]
    fn test_upper_cell_needs_support() {
        let mut game = Pylos::new();
        let above = action_for(1, 0, 0).unwrap();
        assert_eq!(
            game.step(above),
            Err(GameError::IllegalAction { action: above })
        );

        for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            game.step(action_for(0, r, c).unwrap()).unwrap();
        }
        assert!(game.legal_actions().contains(&above));
        game.step(above).unwrap();
        assert_eq!(game.cell(above), 1);
    }

    #[test]
    fn test_occupied_cell_is_illegal() {
        let mut game = Pylos::new();
        game.step(5).unwrap();
        assert_eq!(game.step(5), Err(GameError::IllegalAction { action: 5 }));
        assert_eq!(game.history_len(), 1);
    }

    #[test]
    fn test_reserves_and_undo() {
        let mut game = Pylos::new();
        let before = game.clone();

        game.step(0).unwrap();
        assert_eq!(game.reserve(1), RESERVE - 1);
        assert_eq!(game.reserve(-1), RESERVE);
        assert_eq!(game.turn_sign(), -1.0);

        game.undo_last_action().unwrap();
        assert_eq!(game, before);
        assert_eq!(game.undo_last_action(), Err(GameError::EmptyHistory));
    }

    #[test]
    fn test_observation_perspective() {
        let mut game = Pylos::new();
        game.step(0).unwrap();

        // Black to move: white's ball is an opponent ball
        let obs = game.to_observation();
        assert_eq!(obs.len(), NUM_CELLS);
        assert_eq!(obs[0], -1.0);
        assert!(obs[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_filling_the_pyramid_ends_the_game() {
        let mut game = Pylos::new();
        // Fill bottom to top; ascending ids always respect support.
        for action in 0..NUM_CELLS {
            assert!(game.result().is_none());
            game.step(action).unwrap();
        }

        // 30 alternating placements: black fills the apex
        assert_eq!(game.cell(APEX), -1);
        assert_eq!(game.result(), Some(-1.0));
        assert!(game.legal_actions().is_empty());
        assert_eq!(game.reserve(1), 0);
        assert_eq!(game.reserve(-1), 0);
        assert_eq!(
            game.first_person_result(),
            Some(game.result().unwrap() * game.turn_sign())
        );
    }

    #[test]
    fn test_random_games_step_undo_round_trip() {
        for seed in 0..20 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut game = Pylos::new();
            game.reset(&mut rng);
            let initial = game.to_observation();

            while !game.is_terminal() {
                let legal = game.legal_actions();
                assert!(!legal.is_empty(), "seed={}", seed);
                let action = legal[rng.gen_range(0..legal.len())];

                let before = game.to_observation();
                game.step(action).unwrap();
                game.undo_last_action().unwrap();
                assert_eq!(game.to_observation(), before, "seed={}", seed);
                game.step(action).unwrap();
                assert!(game.history_len() <= game.max_game_length());
            }

            while game.history_len() > 0 {
                game.undo_last_action().unwrap();
            }
            assert_eq!(game.to_observation(), initial, "seed={}", seed);
            assert_eq!(game, Pylos::new());
        }
    }

    #[test]
    fn test_registration() {
        register_pylos();
        let game = engine_core::create_game("pylos").unwrap();
        assert_eq!(game.action_space_size(), NUM_CELLS);
        assert_eq!(game.observation_size(), NUM_CELLS);
    }
}
