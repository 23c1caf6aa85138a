//! Self-play: one full game of the oracle against itself.
//!
//! Every position reached records the observation, the root visit
//! distribution and whose turn it was. Once the game ends each record is
//! turned into a training sample whose value target is the final result
//! from that position's mover's point of view.

use anyhow::{anyhow, bail, Context, Result};
use engine_core::Game;
use mcts::{
    run_mcts, select_action, Evaluator, MctsConfig, SearchStats, TemperatureSchedule,
    TrainingSample,
};
use rand_chacha::ChaCha20Rng;
use tracing::trace;

/// Search and move-selection settings for self-play.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfPlayConfig {
    pub mcts: MctsConfig,
    pub schedule: TemperatureSchedule,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            mcts: MctsConfig::for_training(),
            schedule: TemperatureSchedule::default(),
        }
    }
}

/// Outcome of one self-play game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// One sample per position, in play order
    pub samples: Vec<TrainingSample>,
    /// Final result from the first player's perspective
    pub result: f32,
    pub moves: usize,
    /// Search counters summed over every move
    pub search_stats: SearchStats,
}

/// Play one game from the initial position.
///
/// The game is reset first. Fails if the game is still running after
/// `max_game_length()` plies.
pub fn play_game<E: Evaluator + ?Sized>(
    game: &mut dyn Game,
    evaluator: &E,
    config: &SelfPlayConfig,
    rng: &mut ChaCha20Rng,
) -> Result<GameRecord> {
    game.reset(rng);
    let max_length = game.max_game_length();

    let mut positions: Vec<(Vec<f32>, Vec<f32>, f32)> = Vec::new();
    let mut search_stats = SearchStats::default();

    while !game.is_terminal() {
        let ply = positions.len();
        if ply >= max_length {
            bail!(
                "{} still running after {} plies (max_game_length)",
                game.env_id(),
                max_length
            );
        }

        let search = run_mcts(game, evaluator, config.mcts.clone(), rng)
            .with_context(|| format!("search failed at ply {ply}"))?;
        accumulate(&mut search_stats, &search.stats);

        let mode = config.schedule.mode_for_move(ply as u32);
        let action = select_action(&search.visit_counts, mode, rng)?;
        trace!(ply, action, root_value = search.value, "Self-play move");

        positions.push((game.to_observation(), search.policy, game.turn_sign()));
        game.step(action)
            .with_context(|| format!("selected action {action} rejected at ply {ply}"))?;
    }

    let result = game
        .result()
        .ok_or_else(|| anyhow!("terminal game reported no result"))?;
    let moves = positions.len();
    let samples = positions
        .into_iter()
        .map(|(observation, policy, sign)| TrainingSample {
            observation,
            policy,
            value: result * sign,
        })
        .collect();

    Ok(GameRecord {
        samples,
        result,
        moves,
        search_stats,
    })
}

fn accumulate(total: &mut SearchStats, stats: &SearchStats) {
    total.evaluations += stats.evaluations;
    total.seed_evaluations += stats.seed_evaluations;
    total.terminal_hits += stats.terminal_hits;
    total.game_steps += stats.game_steps;
    total.total_time_us += stats.total_time_us;
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{ActionId, GameError};
    use games_connect4::Connect4;
    use mcts::UniformEvaluator;
    use rand::SeedableRng;

    fn fast_config() -> SelfPlayConfig {
        SelfPlayConfig {
            mcts: MctsConfig::for_testing().with_simulations(8),
            schedule: TemperatureSchedule::constant(1.0),
        }
    }

    #[test]
    fn test_samples_carry_result_from_mover_perspective() {
        let mut game = Connect4::new();
        let mut rng = ChaCha20Rng::seed_from_u64(11);

        let record = play_game(&mut game, &UniformEvaluator::new(), &fast_config(), &mut rng).unwrap();

        assert_eq!(record.samples.len(), record.moves);
        assert_eq!(game.history_len(), record.moves);
        assert!(record.moves >= 7, "connect4 cannot end before ply 7");
        assert!([1.0, -1.0, 0.0].contains(&record.result));

        for (ply, sample) in record.samples.iter().enumerate() {
            // First player moves on even plies
            let sign = if ply % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(sample.value, record.result * sign);
            assert_eq!(sample.observation.len(), game.observation_size());
            let mass: f32 = sample.policy.iter().sum();
            assert!((mass - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let evaluator = UniformEvaluator::new();
        let mut a = Connect4::new();
        let mut b = Connect4::new();

        let first = play_game(&mut a, &evaluator, &fast_config(), &mut ChaCha20Rng::seed_from_u64(5)).unwrap();
        let second = play_game(&mut b, &evaluator, &fast_config(), &mut ChaCha20Rng::seed_from_u64(5)).unwrap();

        assert_eq!(first.samples, second.samples);
        assert_eq!(first.result, second.result);
    }

    #[test]
    fn test_greedy_schedule_after_threshold() {
        let config = SelfPlayConfig {
            schedule: TemperatureSchedule::constant(1.0).with_threshold(2, 0.0),
            ..fast_config()
        };
        let mut game = Connect4::new();
        let mut rng = ChaCha20Rng::seed_from_u64(3);

        let record = play_game(&mut game, &UniformEvaluator::new(), &config, &mut rng).unwrap();
        assert!(record.search_stats.evaluations > 0);
        assert!(game.is_terminal());
    }

    /// Counter game that never ends.
    #[derive(Debug, Default)]
    struct Endless {
        history: Vec<ActionId>,
    }

    impl Game for Endless {
        fn env_id(&self) -> &'static str {
            "endless"
        }
        fn action_space_size(&self) -> usize {
            2
        }
        fn observation_shape(&self) -> &'static [usize] {
            &[1]
        }
        fn max_game_length(&self) -> usize {
            5
        }
        fn reset(&mut self, _rng: &mut ChaCha20Rng) {
            self.history.clear();
        }
        fn legal_actions(&self) -> Vec<ActionId> {
            vec![0, 1]
        }
        fn step(&mut self, action: ActionId) -> Result<(), GameError> {
            if action > 1 {
                return Err(GameError::IllegalAction { action });
            }
            self.history.push(action);
            Ok(())
        }
        fn undo_last_action(&mut self) -> Result<(), GameError> {
            self.history.pop().map(|_| ()).ok_or(GameError::EmptyHistory)
        }
        fn history_len(&self) -> usize {
            self.history.len()
        }
        fn to_observation(&self) -> Vec<f32> {
            vec![self.history.len() as f32]
        }
        fn result(&self) -> Option<f32> {
            None
        }
        fn turn_sign(&self) -> f32 {
            if self.history.len() % 2 == 0 {
                1.0
            } else {
                -1.0
            }
        }
    }

    #[test]
    fn test_game_over_length_limit_is_an_error() {
        let mut game = Endless::default();
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let err = play_game(&mut game, &UniformEvaluator::new(), &fast_config(), &mut rng).unwrap_err();
        assert!(err.to_string().contains("max_game_length"));
        assert_eq!(game.history_len(), 5);
    }
}
