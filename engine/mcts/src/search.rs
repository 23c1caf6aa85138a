//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm on a single live game instance:
//! 1. Selection: descend with PUCT, applying each action with `step`
//! 2. Expansion: create one child per legal action using the masked prior
//! 3. Evaluation: value from the evaluator, or the result at terminal nodes
//! 4. Backpropagation: update statistics along the path, then `undo` every
//!    step taken during the descent
//!
//! When a node is expanded, every new child is also evaluated once (value
//! only) and seeded with that visit, so all legal actions carry a value as
//! soon as their parent is expanded.

use std::time::Instant;

use engine_core::{ActionId, Game, GameError};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::trace;

use crate::config::MctsConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::node::NodeId;
use crate::tree::{MctsTree, TreeStats};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Counters collected during one search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Full (policy + value) evaluations
    pub evaluations: u32,
    /// Value-only evaluations used to seed new children
    pub seed_evaluations: u32,
    /// Simulations that ended on a terminal node
    pub terminal_hits: u32,
    /// `step` calls made on the live game
    pub game_steps: u32,
    /// Wall-clock time of the search (microseconds)
    pub total_time_us: u64,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Root visit distribution over the action space (0 for illegal actions)
    pub policy: Vec<f32>,

    /// Raw root child visit counts, indexed by action
    pub visit_counts: Vec<u32>,

    /// Value estimate for the player to move at the root
    pub value: f32,

    /// Number of simulations performed
    pub simulations: u32,

    pub tree_stats: TreeStats,
    pub stats: SearchStats,
}

impl SearchResult {
    /// Most visited action, ties to the lowest id.
    pub fn best_action(&self) -> Option<ActionId> {
        let mut best: Option<(ActionId, u32)> = None;
        for (action, &visits) in self.visit_counts.iter().enumerate() {
            if visits > 0 && best.map_or(true, |(_, b)| visits > b) {
                best = Some((action, visits));
            }
        }
        best.map(|(a, _)| a)
    }
}

/// MCTS search state.
pub struct MctsSearch<'a, E: Evaluator + ?Sized> {
    tree: MctsTree,
    game: &'a mut dyn Game,
    evaluator: &'a E,
    config: MctsConfig,
    num_actions: usize,
    stats: SearchStats,
}

impl<'a, E: Evaluator + ?Sized> MctsSearch<'a, E> {
    /// Create a new MCTS search rooted at the current position of `game`.
    pub fn new(
        game: &'a mut dyn Game,
        evaluator: &'a E,
        config: MctsConfig,
    ) -> Result<Self, SearchError> {
        if game.is_terminal() || game.legal_actions().is_empty() {
            return Err(SearchError::NoLegalActions);
        }
        if config.c_puct < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "c_puct must be non-negative, got {}",
                config.c_puct
            )));
        }

        let num_actions = game.action_space_size();
        Ok(Self {
            tree: MctsTree::new(),
            game,
            evaluator,
            config,
            num_actions,
            stats: SearchStats::default(),
        })
    }

    /// Run the MCTS search for the configured number of simulations.
    ///
    /// The game is back at the root position when this returns, including
    /// on error.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let root_id = self.tree.root();

        if !self.tree.get(root_id).is_expanded() {
            let value = self.expand_node(root_id, rng)?;
            self.tree.backpropagate(root_id, value);
        }

        if self.config.uses_noise() {
            self.add_dirichlet_noise(rng)?;
        }

        for _ in 0..self.config.num_simulations {
            self.simulate(rng)?;
        }

        self.stats.total_time_us = start.elapsed().as_micros() as u64;

        Ok(SearchResult {
            policy: self.tree.root_policy(self.num_actions),
            visit_counts: self.tree.root_visit_counts(self.num_actions),
            value: self.tree.root_value(),
            simulations: self.config.num_simulations,
            tree_stats: self.tree.stats(),
            stats: self.stats.clone(),
        })
    }

    /// Run a single simulation (select -> expand -> evaluate -> backpropagate).
    fn simulate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let (leaf_id, depth) = self.descend()?;

        let outcome = self.evaluate_leaf(leaf_id, rng);
        self.unwind(depth)?;
        let value = outcome?;

        self.tree.backpropagate(leaf_id, value);

        trace!(
            leaf = leaf_id.0,
            depth = depth,
            value = value,
            "MCTS simulation complete"
        );

        Ok(())
    }

    /// Follow PUCT from the root to a leaf, stepping the game along.
    /// Returns the leaf and the number of steps applied.
    fn descend(&mut self) -> Result<(NodeId, usize), SearchError> {
        let mut current = self.tree.root();
        let mut depth = 0;

        while !self.tree.get(current).is_leaf() {
            let Some(child_id) = self.tree.select_child(current, self.config.c_puct) else {
                break;
            };
            let action = self.tree.get(child_id).action;
            if let Err(e) = self.game.step(action) {
                self.unwind(depth)?;
                return Err(e.into());
            }
            self.stats.game_steps += 1;
            depth += 1;
            current = child_id;
        }

        Ok((current, depth))
    }

    fn unwind(&mut self, depth: usize) -> Result<(), SearchError> {
        for _ in 0..depth {
            self.game.undo_last_action()?;
        }
        Ok(())
    }

    /// Value of the leaf for its player to move, expanding it if needed.
    fn evaluate_leaf(&mut self, leaf_id: NodeId, rng: &mut ChaCha20Rng) -> Result<f32, SearchError> {
        let leaf = self.tree.get(leaf_id);
        if leaf.is_terminal {
            self.stats.terminal_hits += 1;
            return Ok(leaf.terminal_value);
        }

        if let Some(result) = self.game.first_person_result() {
            let leaf = self.tree.get_mut(leaf_id);
            leaf.is_terminal = true;
            leaf.terminal_value = result;
            self.stats.terminal_hits += 1;
            return Ok(result);
        }

        self.expand_node(leaf_id, rng)
    }

    /// Expand a node by adding and seeding all legal children.
    /// Returns the evaluator's value for the node (to be backpropagated).
    fn expand_node(&mut self, node_id: NodeId, rng: &mut ChaCha20Rng) -> Result<f32, SearchError> {
        let eval = self.evaluator.evaluate(&mut *self.game, rng)?;
        self.stats.evaluations += 1;

        let legal = self.game.legal_actions();
        let priors = masked_priors(&eval.policy, &legal);

        for (&action, prior) in legal.iter().zip(priors) {
            let child_id = self.tree.add_child(node_id, action, prior);

            self.game.step(action)?;
            self.stats.game_steps += 1;
            let seed = match self.game.first_person_result() {
                Some(result) => Ok((true, result)),
                None => {
                    self.stats.seed_evaluations += 1;
                    self.evaluator
                        .value(&mut *self.game, rng)
                        .map(|v| (false, v))
                }
            };
            self.game.undo_last_action()?;
            let (is_terminal, value) = seed?;

            let child = self.tree.get_mut(child_id);
            child.is_terminal = is_terminal;
            if is_terminal {
                child.terminal_value = value;
            }
            // Stored for the player choosing the action, i.e. the parent mover
            child.visit_count = 1;
            child.value_sum = -value;
        }

        self.tree.get_mut(node_id).expanded = true;
        Ok(eval.value)
    }

    /// Add Dirichlet noise to root node priors for exploration.
    fn add_dirichlet_noise(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let children: Vec<NodeId> = self
            .tree
            .get(self.tree.root())
            .children
            .iter()
            .map(|(_, id)| *id)
            .collect();

        if children.is_empty() {
            return Ok(());
        }

        let noise = dirichlet_noise(children.len(), self.config.dirichlet_alpha, rng)?;

        let eps = self.config.dirichlet_weight;
        for (child_id, n) in children.into_iter().zip(noise) {
            let child = self.tree.get_mut(child_id);
            child.prior = (1.0 - eps) * child.prior + eps * n;
        }
        Ok(())
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }
}

/// Restrict a policy to the legal actions and renormalize.
///
/// Falls back to uniform when the legal mass is zero (or not finite).
fn masked_priors(policy: &[f32], legal: &[ActionId]) -> Vec<f32> {
    let masked: Vec<f32> = legal
        .iter()
        .map(|&a| match policy.get(a) {
            Some(&p) if p.is_finite() && p > 0.0 => p,
            _ => 0.0,
        })
        .collect();

    let total: f32 = masked.iter().sum();
    if total > 0.0 && total.is_finite() {
        masked.into_iter().map(|p| p / total).collect()
    } else {
        vec![1.0 / legal.len() as f32; legal.len()]
    }
}

/// Generate Dirichlet-distributed noise using Gamma variates.
pub(crate) fn dirichlet_noise(
    n: usize,
    alpha: f32,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<f32>, SearchError> {
    use rand_distr::{Distribution, Gamma};

    let gamma = Gamma::new(alpha as f64, 1.0)
        .map_err(|e| SearchError::InvalidConfig(format!("dirichlet_alpha {}: {}", alpha, e)))?;
    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng) as f32).collect();

    let sum: f32 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else {
        samples.iter_mut().for_each(|s| *s = 1.0 / n as f32);
    }

    Ok(samples)
}

/// Convenience function to run a single MCTS search.
pub fn run_mcts<E: Evaluator + ?Sized>(
    game: &mut dyn Game,
    evaluator: &E,
    config: MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult, SearchError> {
    let mut search = MctsSearch::new(game, evaluator, config)?;
    search.run(rng)
}
