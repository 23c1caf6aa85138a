//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations to run per search, after the root expansion.
    pub num_simulations: u32,

    /// Exploration constant for the PUCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,

    /// Dirichlet noise alpha for root node exploration.
    /// Set to 0.0 to disable noise (for evaluation/inference).
    pub dirichlet_alpha: f32,

    /// Fraction of each root prior that comes from Dirichlet noise.
    /// 0.25 means 75% prior + 25% noise.
    pub dirichlet_weight: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 64,
            c_puct: 1.5,
            dirichlet_alpha: 0.3,
            dirichlet_weight: 0.25,
        }
    }
}

impl MctsConfig {
    /// Create config for self-play training (with exploration noise).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Create config for evaluation matches (no noise).
    pub fn for_evaluation() -> Self {
        Self {
            num_simulations: 128,
            c_puct: 1.0,
            dirichlet_alpha: 0.0, // No noise
            dirichlet_weight: 0.0,
        }
    }

    /// Create a fast, deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            c_puct: 1.5,
            dirichlet_alpha: 0.0,
            dirichlet_weight: 0.0,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set root noise; alpha 0.0 disables it.
    pub fn with_dirichlet(mut self, alpha: f32, weight: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_weight = weight;
        self
    }

    /// Whether root noise will be applied.
    pub fn uses_noise(&self) -> bool {
        self.dirichlet_alpha > 0.0 && self.dirichlet_weight > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 64);
        assert!((config.c_puct - 1.5).abs() < 1e-6);
        assert!(config.uses_noise());
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_simulations(100)
            .with_c_puct(2.0)
            .with_dirichlet(0.0, 0.25);

        assert_eq!(config.num_simulations, 100);
        assert!((config.c_puct - 2.0).abs() < 1e-6);
        assert!(!config.uses_noise());
    }

    #[test]
    fn test_evaluation_config() {
        let config = MctsConfig::for_evaluation();
        assert!(!config.uses_noise());
        assert_eq!(config.num_simulations, 128);
    }
}
