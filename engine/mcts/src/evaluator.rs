//! Leaf evaluators used by the search.
//!
//! An evaluator looks at the live game (the position the search has reached)
//! and returns a prior over actions plus a value for the player to move.
//! Two families exist:
//! - [`OracleEvaluator`] asks an [`Oracle`] about the current observation.
//! - [`RolloutEvaluator`] plays random moves to the end of the game with
//!   step/undo and uses a uniform prior. This is the pure-search "classic
//!   MCTS" opponent.

use engine_core::{Game, GameError};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

use crate::oracle::{EvalResult, Oracle, OracleError};

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Game error during rollout: {0}")]
    Game(#[from] GameError),

    #[error("Policy has {actual} entries, action space has {expected}")]
    PolicySize { expected: usize, actual: usize },
}

/// Trait for position evaluators.
///
/// Implementations may move the game around while evaluating, but must
/// return it to the position they were given.
pub trait Evaluator {
    /// Prior and value for the player to move in `game`.
    fn evaluate(
        &self,
        game: &mut dyn Game,
        rng: &mut ChaCha20Rng,
    ) -> Result<EvalResult, EvaluatorError>;

    /// Value for the player to move in `game`.
    fn value(&self, game: &mut dyn Game, rng: &mut ChaCha20Rng) -> Result<f32, EvaluatorError> {
        Ok(self.evaluate(game, rng)?.value)
    }
}

/// Uniform prior over legal actions with a neutral value.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(
        &self,
        game: &mut dyn Game,
        _rng: &mut ChaCha20Rng,
    ) -> Result<EvalResult, EvaluatorError> {
        Ok(EvalResult {
            value: 0.0,
            policy: uniform_over_legal(game),
        })
    }
}

/// Evaluates positions with an [`Oracle`].
pub struct OracleEvaluator<'a, O: Oracle + ?Sized> {
    oracle: &'a O,
}

impl<'a, O: Oracle + ?Sized> OracleEvaluator<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }
}

impl<O: Oracle + ?Sized> Evaluator for OracleEvaluator<'_, O> {
    fn evaluate(
        &self,
        game: &mut dyn Game,
        _rng: &mut ChaCha20Rng,
    ) -> Result<EvalResult, EvaluatorError> {
        let result = self.oracle.evaluate(&game.to_observation())?;
        let expected = game.action_space_size();
        if result.policy.len() != expected {
            return Err(EvaluatorError::PolicySize {
                expected,
                actual: result.policy.len(),
            });
        }
        Ok(result)
    }

    fn value(&self, game: &mut dyn Game, _rng: &mut ChaCha20Rng) -> Result<f32, EvaluatorError> {
        Ok(self.oracle.value(&game.to_observation())?)
    }
}

/// Random rollout evaluator that plays random moves to a terminal state.
/// Returns the game outcome as the value estimate.
#[derive(Debug, Clone, Default)]
pub struct RolloutEvaluator {
    /// Optional cap on rollout length; unfinished rollouts score 0.
    pub max_depth: Option<usize>,
}

impl RolloutEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    fn rollout(&self, game: &mut dyn Game, rng: &mut ChaCha20Rng) -> Result<f32, EvaluatorError> {
        let limit = self.max_depth.unwrap_or_else(|| game.max_game_length());
        let root_sign = game.turn_sign();
        let mut plies = 0;

        // Global result; turn order is left to the game.
        let outcome = loop {
            if let Some(result) = game.result() {
                break Ok(result);
            }
            if plies >= limit {
                break Ok(0.0);
            }
            let legal = game.legal_actions();
            let Some(&action) = legal.choose(rng) else {
                break Ok(0.0);
            };
            if let Err(e) = game.step(action) {
                break Err(e);
            }
            plies += 1;
        };

        for _ in 0..plies {
            game.undo_last_action()?;
        }
        Ok(outcome? * root_sign)
    }
}

impl Evaluator for RolloutEvaluator {
    fn evaluate(
        &self,
        game: &mut dyn Game,
        rng: &mut ChaCha20Rng,
    ) -> Result<EvalResult, EvaluatorError> {
        let value = self.rollout(game, rng)?;
        Ok(EvalResult {
            value,
            policy: uniform_over_legal(game),
        })
    }

    fn value(&self, game: &mut dyn Game, rng: &mut ChaCha20Rng) -> Result<f32, EvaluatorError> {
        self.rollout(game, rng)
    }
}

fn uniform_over_legal(game: &dyn Game) -> Vec<f32> {
    let mut policy = vec![0.0; game.action_space_size()];
    let legal = game.legal_actions();
    if !legal.is_empty() {
        let p = 1.0 / legal.len() as f32;
        for action in legal {
            policy[action] = p;
        }
    }
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::UniformOracle;
    use engine_core::ActionId;
    use games_connect4::Connect4;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_evaluator() {
        let mut game = Connect4::new();
        // Fill column 0
        for _ in 0..6 {
            game.step(0).unwrap();
        }
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let result = UniformEvaluator::new().evaluate(&mut game, &mut rng).unwrap();

        assert!(result.policy[0].abs() < 1e-6);
        for p in &result.policy[1..] {
            assert!((p - 1.0 / 6.0).abs() < 1e-6);
        }
        assert!(result.value.abs() < 1e-6);
    }

    #[test]
    fn test_oracle_evaluator_checks_policy_size() {
        let mut game = Connect4::new();
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let oracle = UniformOracle::new(7);
        let result = OracleEvaluator::new(&oracle)
            .evaluate(&mut game, &mut rng)
            .unwrap();
        assert_eq!(result.policy.len(), 7);

        let wrong = UniformOracle::new(3);
        let err = OracleEvaluator::new(&wrong)
            .evaluate(&mut game, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluatorError::PolicySize {
                expected: 7,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_rollout_restores_position() {
        let mut game = Connect4::new();
        game.step(3).unwrap();
        let before = game.clone();

        let evaluator = RolloutEvaluator::new();
        for seed in 0..10 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let value = evaluator.value(&mut game, &mut rng).unwrap();
            assert!((-1.0..=1.0).contains(&value));
            assert_eq!(game, before);
        }
    }

    #[test]
    fn test_rollout_value_is_from_mover_perspective() {
        // Red has already won; Yellow is to move.
        let mut game = Connect4::new();
        for col in [0, 0, 1, 1, 2, 2, 3] {
            game.step(col).unwrap();
        }
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let value = RolloutEvaluator::new().value(&mut game, &mut rng).unwrap();
        assert_eq!(value, -1.0);

        // One ply earlier Red is to move. A single random ply either wins
        // (seen from Red: +1) or is cut off by the depth cap (0).
        game.undo_last_action().unwrap();
        let result = RolloutEvaluator::with_max_depth(1)
            .value(&mut game, &mut rng)
            .unwrap();
        assert!(result == 1.0 || result == 0.0);
    }

    /// Solitaire counter: the first player makes every move and wins on
    /// reaching three.
    #[derive(Debug, Default)]
    struct Solitaire {
        moves: usize,
    }

    impl Game for Solitaire {
        fn env_id(&self) -> &'static str {
            "solitaire"
        }
        fn action_space_size(&self) -> usize {
            1
        }
        fn observation_shape(&self) -> &'static [usize] {
            &[1]
        }
        fn max_game_length(&self) -> usize {
            3
        }
        fn reset(&mut self, _rng: &mut ChaCha20Rng) {
            self.moves = 0;
        }
        fn legal_actions(&self) -> Vec<ActionId> {
            if self.moves < 3 {
                vec![0]
            } else {
                Vec::new()
            }
        }
        fn step(&mut self, action: ActionId) -> Result<(), GameError> {
            if action != 0 || self.moves >= 3 {
                return Err(GameError::IllegalAction { action });
            }
            self.moves += 1;
            Ok(())
        }
        fn undo_last_action(&mut self) -> Result<(), GameError> {
            if self.moves == 0 {
                return Err(GameError::EmptyHistory);
            }
            self.moves -= 1;
            Ok(())
        }
        fn history_len(&self) -> usize {
            self.moves
        }
        fn to_observation(&self) -> Vec<f32> {
            vec![self.moves as f32]
        }
        fn result(&self) -> Option<f32> {
            (self.moves == 3).then_some(1.0)
        }
        fn turn_sign(&self) -> f32 {
            1.0
        }
    }

    #[test]
    fn test_rollout_value_does_not_assume_alternating_turns() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        for start in 0..3 {
            let mut game = Solitaire { moves: start };
            let value = RolloutEvaluator::new().value(&mut game, &mut rng).unwrap();
            assert_eq!(value, 1.0, "start at {start}");
            assert_eq!(game.moves, start);
        }
    }

    #[test]
    fn test_rollout_depth_cap() {
        let mut game = Connect4::new();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let value = RolloutEvaluator::with_max_depth(0)
            .value(&mut game, &mut rng)
            .unwrap();
        assert_eq!(value, 0.0);
    }
}
