//! Self-play training loop.
//!
//! Each iteration plays one self-play game with the current oracle, appends
//! its samples to the replay buffer and, once the buffer holds a full batch,
//! runs `epochs` passes of shuffled mini-batch updates. The average loss of
//! the iteration feeds the oracle's learning-rate schedule and decides
//! whether a periodic checkpoint is written.

use std::path::PathBuf;

use anyhow::{Context, Result};
use engine_core::Game;
use indicatif::{ProgressBar, ProgressStyle};
use linear_oracle::MODEL_FILE;
use mcts::{Oracle, OracleEvaluator, SearchStats, TrainingSample, UpdateLoss};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, warn};

use crate::replay::ReplayBuffer;
use crate::self_play::{play_game, GameRecord, SelfPlayConfig};

/// Settings for one training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub selfplay_games: u32,
    /// Checkpoint cadence in games (0 disables periodic checkpoints)
    pub games_per_checkpoint: u32,
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub epochs: u32,
    pub checkpoint_dir: PathBuf,
    /// Load an existing checkpoint from `checkpoint_dir` before training
    pub resume: bool,
    pub self_play: SelfPlayConfig,
}

/// What a finished run did.
#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    pub games_played: u32,
    pub samples_generated: u64,
    pub updates: u64,
    pub checkpoints_saved: u32,
    /// Lowest average loss that triggered a checkpoint
    pub best_loss: Option<f32>,
    pub last_loss: Option<UpdateLoss>,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub draws: u32,
}

impl TrainingSummary {
    fn record_result(&mut self, result: f32) {
        if result > 0.0 {
            self.player1_wins += 1;
        } else if result < 0.0 {
            self.player2_wins += 1;
        } else {
            self.draws += 1;
        }
    }
}

pub struct Trainer<'a, O: Oracle> {
    game: &'a mut dyn Game,
    oracle: &'a mut O,
    config: TrainingConfig,
    buffer: ReplayBuffer<TrainingSample>,
}

impl<'a, O: Oracle> Trainer<'a, O> {
    pub fn new(game: &'a mut dyn Game, oracle: &'a mut O, config: TrainingConfig) -> Result<Self> {
        let buffer = ReplayBuffer::new(config.replay_capacity)?;
        Ok(Self {
            game,
            oracle,
            config,
            buffer,
        })
    }

    /// Run the full loop and write the final checkpoint.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<TrainingSummary> {
        if self.config.resume {
            self.resume()?;
        }

        info!(
            env_id = self.game.env_id(),
            selfplay_games = self.config.selfplay_games,
            batch_size = self.config.batch_size,
            replay_capacity = self.buffer.capacity(),
            epochs = self.config.epochs,
            num_simulations = self.config.self_play.mcts.num_simulations,
            checkpoint_dir = %self.config.checkpoint_dir.display(),
            "Starting training"
        );

        let progress = progress_bar(self.config.selfplay_games as u64);
        let mut summary = TrainingSummary::default();
        let mut search_stats = SearchStats::default();

        for game_index in 0..self.config.selfplay_games {
            let record = self.self_play(rng)?;
            summary.games_played += 1;
            summary.samples_generated += record.samples.len() as u64;
            summary.record_result(record.result);
            search_stats.evaluations += record.search_stats.evaluations;
            search_stats.total_time_us += record.search_stats.total_time_us;

            let moves = record.moves;
            let result = record.result;
            self.buffer.extend(record.samples);

            let losses = self
                .train_on_buffer(game_index, rng)
                .with_context(|| format!("training failed after game {game_index}"))?;
            summary.updates += losses.len() as u64;

            let average = average_loss(&losses);
            if let Some(loss) = average {
                self.oracle.observe_game_loss(loss.total());
                summary.last_loss = Some(loss);
            }

            let log_game = || {
                info!(
                    game = game_index,
                    moves,
                    result,
                    buffer_len = self.buffer.len(),
                    updates = losses.len(),
                    value_loss = average.map(|l| l.value_loss),
                    policy_loss = average.map(|l| l.policy_loss),
                    "Self-play game finished"
                );
            };
            match progress {
                Some(ref pb) => {
                    pb.inc(1);
                    pb.suspend(log_game);
                }
                None => log_game(),
            }

            let checkpoint_due = self.config.games_per_checkpoint > 0
                && game_index > 0
                && game_index % self.config.games_per_checkpoint == 0;
            if checkpoint_due {
                if let Some(loss) = average.map(|l| l.total()) {
                    if summary.best_loss.map_or(true, |best| loss < best) {
                        self.save()?;
                        summary.best_loss = Some(loss);
                        summary.checkpoints_saved += 1;
                        info!(game = game_index, loss, "Saved improved checkpoint");
                    }
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        self.save()?;
        summary.checkpoints_saved += 1;

        let avg_search_us = if search_stats.evaluations > 0 {
            search_stats.total_time_us as f64 / search_stats.evaluations as f64
        } else {
            0.0
        };
        info!(
            games = summary.games_played,
            samples = summary.samples_generated,
            updates = summary.updates,
            replay_pushed = self.buffer.total_pushed(),
            player1_wins = summary.player1_wins,
            player2_wins = summary.player2_wins,
            draws = summary.draws,
            avg_us_per_evaluation = format!("{:.1}", avg_search_us),
            "Training finished"
        );
        Ok(summary)
    }

    fn self_play(&mut self, rng: &mut ChaCha20Rng) -> Result<GameRecord> {
        let evaluator = OracleEvaluator::new(&*self.oracle);
        play_game(&mut *self.game, &evaluator, &self.config.self_play, rng)
    }

    /// `epochs` passes of shuffled full batches. Empty while the buffer is
    /// smaller than one batch.
    fn train_on_buffer(&mut self, game_index: u32, rng: &mut ChaCha20Rng) -> Result<Vec<UpdateLoss>> {
        let mut losses = Vec::new();
        if self.buffer.len() < self.config.batch_size {
            return Ok(losses);
        }

        for epoch in 0..self.config.epochs {
            for (batch_index, batch) in self
                .buffer
                .shuffled_batches(self.config.batch_size, rng)
                .iter()
                .enumerate()
            {
                let loss = self.oracle.update(batch)?;
                debug!(
                    game = game_index,
                    epoch,
                    batch = batch_index,
                    value_loss = loss.value_loss,
                    policy_loss = loss.policy_loss,
                    "Batch update"
                );
                losses.push(loss);
            }
        }
        Ok(losses)
    }

    fn resume(&mut self) -> Result<()> {
        let dir = &self.config.checkpoint_dir;
        if dir.join(MODEL_FILE).exists() {
            self.oracle
                .load(dir)
                .with_context(|| format!("failed to resume from {}", dir.display()))?;
            info!(checkpoint_dir = %dir.display(), "Resumed from checkpoint");
        } else {
            warn!(
                checkpoint_dir = %dir.display(),
                "No checkpoint to resume from, starting fresh"
            );
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let dir = &self.config.checkpoint_dir;
        self.oracle
            .save(dir)
            .with_context(|| format!("failed to save checkpoint to {}", dir.display()))
    }
}

fn average_loss(losses: &[UpdateLoss]) -> Option<UpdateLoss> {
    if losses.is_empty() {
        return None;
    }
    let n = losses.len() as f32;
    Some(UpdateLoss {
        value_loss: losses.iter().map(|l| l.value_loss).sum::<f32>() / n,
        policy_loss: losses.iter().map(|l| l.policy_loss).sum::<f32>() / n,
    })
}

/// Only drawn when stderr is a terminal.
fn progress_bar(games: u64) -> Option<ProgressBar> {
    if games == 0 || !std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        return None;
    }
    let pb = ProgressBar::new(games);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    Some(pb)
}
