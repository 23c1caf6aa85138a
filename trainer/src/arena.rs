//! Head-to-head play between two search agents.
//!
//! An [`Agent`] pairs an evaluator with its own search settings, so an
//! oracle-guided agent and a rollout-based classic MCTS agent can meet with
//! different simulation budgets.

use anyhow::{anyhow, bail, Context, Result};
use engine_core::{ActionId, Game};
use mcts::{run_mcts, select_action, Evaluator, MctsConfig, SelectionMode};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use tracing::{debug, info};

/// Search settings for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub num_simulations: u32,
    pub c_puct: f32,
    /// `(alpha, weight)`; `None` plays without root noise
    pub dirichlet: Option<(f32, f32)>,
    pub selection: SelectionMode,
}

impl AgentConfig {
    /// Noise-free search with greedy move choice.
    pub fn greedy(num_simulations: u32, c_puct: f32) -> Self {
        Self {
            num_simulations,
            c_puct,
            dirichlet: None,
            selection: SelectionMode::Greedy,
        }
    }

    pub fn with_selection(mut self, selection: SelectionMode) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_dirichlet(mut self, alpha: f32, weight: f32) -> Self {
        self.dirichlet = Some((alpha, weight));
        self
    }

    fn mcts_config(&self) -> MctsConfig {
        let (alpha, weight) = self.dirichlet.unwrap_or((0.0, 0.0));
        MctsConfig {
            num_simulations: self.num_simulations,
            c_puct: self.c_puct,
            dirichlet_alpha: alpha,
            dirichlet_weight: weight,
        }
    }
}

pub struct Agent<'a> {
    name: String,
    evaluator: &'a dyn Evaluator,
    config: AgentConfig,
}

impl<'a> Agent<'a> {
    pub fn new(name: impl Into<String>, evaluator: &'a dyn Evaluator, config: AgentConfig) -> Self {
        Self {
            name: name.into(),
            evaluator,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Search the current position and pick a move.
    pub fn select_move(&self, game: &mut dyn Game, rng: &mut ChaCha20Rng) -> Result<ActionId> {
        let search = run_mcts(game, self.evaluator, self.config.mcts_config(), rng)
            .with_context(|| format!("{} failed to search", self.name))?;
        Ok(select_action(&search.visit_counts, self.config.selection, rng)?)
    }
}

/// Play one game from the initial position. `first` moves whenever
/// `turn_sign()` is +1.
///
/// Returns 1 if `first` won, -1 if `second` won and 0 for a draw.
pub fn pit(
    game: &mut dyn Game,
    first: &Agent<'_>,
    second: &Agent<'_>,
    rng: &mut ChaCha20Rng,
) -> Result<i32> {
    game.reset(rng);
    let max_length = game.max_game_length();

    let result = loop {
        if let Some(result) = game.result() {
            break result;
        }
        let ply = game.history_len();
        if ply >= max_length {
            bail!(
                "{} vs {}: game still running after {} plies",
                first.name(),
                second.name(),
                max_length
            );
        }
        let agent = if game.turn_sign() > 0.0 { first } else { second };
        let action = agent.select_move(game, rng)?;
        game.step(action)
            .with_context(|| format!("{} chose illegal action {}", agent.name(), action))?;
    };

    Ok(if result > 0.0 {
        1
    } else if result < 0.0 {
        -1
    } else {
        0
    })
}

/// Tally of a match, from the first agent's point of view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStats {
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
}

impl MatchStats {
    pub fn record(&mut self, outcome: i32) {
        match outcome.signum() {
            1 => self.first_wins += 1,
            -1 => self.second_wins += 1,
            _ => self.draws += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.first_wins + self.second_wins + self.draws
    }

    /// Wins plus half the draws, over games played.
    pub fn first_score(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        (self.first_wins as f64 + 0.5 * self.draws as f64) / games as f64
    }
}

/// Play `games` games with `first` always moving first.
pub fn run_match(
    game: &mut dyn Game,
    first: &Agent<'_>,
    second: &Agent<'_>,
    games: u32,
    rng: &mut ChaCha20Rng,
) -> Result<MatchStats> {
    let mut stats = MatchStats::default();
    for index in 0..games {
        let outcome = pit(game, first, second, rng)
            .with_context(|| format!("match game {index} failed"))?;
        debug!(game = index, outcome, plies = game.history_len(), "Arena game finished");
        stats.record(outcome);
    }
    info!(
        first = first.name(),
        second = second.name(),
        first_simulations = first.config().num_simulations,
        second_simulations = second.config().num_simulations,
        games = stats.games(),
        first_wins = stats.first_wins,
        second_wins = stats.second_wins,
        draws = stats.draws,
        "Match finished"
    );
    Ok(stats)
}

/// Evaluation scenarios offered by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EvalMode {
    /// Trained oracle against itself
    #[value(name = "self")]
    SelfPlay,
    /// Trained oracle against classic MCTS, in both seat orders
    Classic,
    /// Classic MCTS against itself
    Baseline,
}

/// Results of one evaluation run, keyed by pairing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    pub matches: Vec<(String, String, MatchStats)>,
}

/// Run the pairings of `mode`. `classic` is the rollout agent, `oracle` the
/// trained one; modes that do not use an agent ignore it.
pub fn evaluate(
    game: &mut dyn Game,
    mode: EvalMode,
    oracle: &Agent<'_>,
    classic: &Agent<'_>,
    games: u32,
    rng: &mut ChaCha20Rng,
) -> Result<EvaluationReport> {
    let pairings: Vec<(&Agent<'_>, &Agent<'_>)> = match mode {
        EvalMode::SelfPlay => vec![(oracle, oracle)],
        EvalMode::Classic => vec![(oracle, classic), (classic, oracle)],
        EvalMode::Baseline => vec![(classic, classic)],
    };
    if games == 0 {
        return Err(anyhow!("evaluation needs at least one game"));
    }

    let mut report = EvaluationReport::default();
    for (first, second) in pairings {
        let stats = run_match(game, first, second, games, rng)?;
        report
            .matches
            .push((first.name().to_string(), second.name().to_string(), stats));
    }
    Ok(report)
}
