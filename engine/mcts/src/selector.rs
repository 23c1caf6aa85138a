//! Turning root visit counts into a move.
//!
//! Self-play samples proportionally to `visits^(1/temperature)` so early
//! moves stay diverse; evaluation always plays the most visited action.

use engine_core::ActionId;
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::search::{SearchError, SearchResult};

/// Temperatures at or below this are treated as greedy.
pub const GREEDY_EPSILON: f32 = 1e-6;

/// How a move is picked from a visit distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMode {
    /// Argmax of visit counts; ties go to the first action.
    Greedy,
    /// Sample proportional to `visits^(1/temperature)`.
    Sample { temperature: f32 },
}

impl SelectionMode {
    pub fn sample(temperature: f32) -> Self {
        if temperature <= GREEDY_EPSILON {
            Self::Greedy
        } else {
            Self::Sample { temperature }
        }
    }
}

/// Self-play temperature schedule.
///
/// The first `temp_threshold` moves of a game use `temperature`; later moves
/// use `late_temperature`. A threshold of 0 keeps `temperature` for the whole
/// game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureSchedule {
    pub temperature: f32,
    pub temp_threshold: u32,
    pub late_temperature: f32,
}

impl Default for TemperatureSchedule {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

impl TemperatureSchedule {
    pub fn constant(temperature: f32) -> Self {
        Self {
            temperature,
            temp_threshold: 0,
            late_temperature: temperature,
        }
    }

    pub fn with_threshold(mut self, temp_threshold: u32, late_temperature: f32) -> Self {
        self.temp_threshold = temp_threshold;
        self.late_temperature = late_temperature;
        self
    }

    /// Selection mode for the move with the given zero-based index.
    pub fn mode_for_move(&self, move_index: u32) -> SelectionMode {
        if self.temp_threshold == 0 || move_index < self.temp_threshold {
            SelectionMode::sample(self.temperature)
        } else {
            SelectionMode::sample(self.late_temperature)
        }
    }
}

/// Temperature-scaled distribution over actions.
///
/// Counts are divided by their maximum before exponentiation so small
/// temperatures cannot overflow. Greedy temperatures put all mass on the
/// argmax. All zeros if nothing was visited.
pub fn visit_distribution(visit_counts: &[u32], temperature: f32) -> Vec<f32> {
    let mut policy = vec![0.0; visit_counts.len()];
    let Some(best) = argmax(visit_counts) else {
        return policy;
    };

    if temperature <= GREEDY_EPSILON {
        policy[best] = 1.0;
        return policy;
    }

    let max = visit_counts[best] as f64;
    let inv_temp = 1.0 / temperature as f64;
    let weights: Vec<f64> = visit_counts
        .iter()
        .map(|&v| {
            if v == 0 {
                0.0
            } else {
                (v as f64 / max).powf(inv_temp)
            }
        })
        .collect();
    let total: f64 = weights.iter().sum();
    for (p, w) in policy.iter_mut().zip(weights) {
        *p = (w / total) as f32;
    }
    policy
}

/// Pick an action from raw root visit counts.
pub fn select_action(
    visit_counts: &[u32],
    mode: SelectionMode,
    rng: &mut ChaCha20Rng,
) -> Result<ActionId, SearchError> {
    match mode {
        SelectionMode::Greedy => argmax(visit_counts).ok_or(SearchError::NoLegalActions),
        SelectionMode::Sample { temperature } => {
            if temperature <= GREEDY_EPSILON {
                return argmax(visit_counts).ok_or(SearchError::NoLegalActions);
            }
            sample_action(&visit_distribution(visit_counts, temperature), rng)
        }
    }
}

/// Pick an action from a finished search.
pub fn select_from_result(
    result: &SearchResult,
    mode: SelectionMode,
    rng: &mut ChaCha20Rng,
) -> Result<ActionId, SearchError> {
    select_action(&result.visit_counts, mode, rng)
}

/// Index of the largest nonzero count; ties go to the lowest index.
fn argmax(visit_counts: &[u32]) -> Option<ActionId> {
    let mut best: Option<(ActionId, u32)> = None;
    for (action, &visits) in visit_counts.iter().enumerate() {
        if visits > 0 && best.map_or(true, |(_, b)| visits > b) {
            best = Some((action, visits));
        }
    }
    best.map(|(a, _)| a)
}

/// Sample an action index from a probability distribution.
fn sample_action(policy: &[f32], rng: &mut ChaCha20Rng) -> Result<ActionId, SearchError> {
    let r: f32 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &p) in policy.iter().enumerate() {
        cumsum += p;
        if p > 0.0 && r < cumsum {
            return Ok(i);
        }
    }

    // Fallback to last non-zero action (handles floating point issues)
    for (i, &p) in policy.iter().enumerate().rev() {
        if p > 0.0 {
            return Ok(i);
        }
    }

    Err(SearchError::NoLegalActions)
}
