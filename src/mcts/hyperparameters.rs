//! MCTS Hyperparameters Configuration
//!
//! All tunable knobs of one search run. Values can come from defaults, a JSON file
//! or the command line; [`MCTSHyperparameters::validate`] is the single gate every
//! source goes through before an engine is built.

use crate::mcts::action::ActionCatalog;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a rollout picks its next action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SimulationPolicy {
    /// Take every remaining action in catalog order
    Exhaustive,
    /// Pick uniformly among the available actions
    Random,
}

/// How a finished rollout is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RewardScheme {
    /// 1.0 when the final answer is correct, else 0.0
    Binary,
    /// 2^(K - i) when the correct answer first appears at step i of K
    Graded,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("exploration constant must be a finite, non-negative number (got {0})")]
    InvalidExplorationConstant(f64),

    #[error("could not parse configuration: {0}")]
    Parse(String),

    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// MCTS hyperparameters configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MCTSHyperparameters {
    /// Selection/expansion/simulation/backpropagation rounds per example
    /// Default: 20
    pub rollouts: usize,

    /// UCB1 exploration constant, ≈ √2
    /// Default: 1.4
    pub exploration_constant: f64,

    /// Default: Exhaustive
    pub simulation_policy: SimulationPolicy,

    /// Default: Binary
    pub reward_scheme: RewardScheme,

    /// Offer an explicit FINISH action
    /// Default: false
    pub allow_finish: bool,

    /// Seed of the generator used by random rollouts
    /// Default: 2025
    pub seed: u64,
}

impl Default for MCTSHyperparameters {
    fn default() -> Self {
        Self {
            rollouts: 20,
            exploration_constant: 1.4,
            simulation_policy: SimulationPolicy::Exhaustive,
            reward_scheme: RewardScheme::Binary,
            allow_finish: false,
            seed: 2025,
        }
    }
}

impl MCTSHyperparameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(ConfigError::InvalidExplorationConstant(
                self.exploration_constant,
            ));
        }
        if self.rollouts == 0 {
            log::warn!("Rollout budget is 0: searches will return the root state");
        }
        Ok(())
    }

    pub fn catalog(&self) -> ActionCatalog {
        ActionCatalog::new(self.allow_finish)
    }

    /// Parses and validates a JSON configuration; absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let hyperparams: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        hyperparams.validate()?;
        Ok(hyperparams)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let hyperparams = MCTSHyperparameters::default();
        assert_eq!(hyperparams.rollouts, 20);
        assert!((hyperparams.exploration_constant - 1.4).abs() < 1e-12);
        assert_eq!(hyperparams.simulation_policy, SimulationPolicy::Exhaustive);
        assert_eq!(hyperparams.reward_scheme, RewardScheme::Binary);
        assert!(hyperparams.validate().is_ok());
        assert!(!hyperparams.catalog().allow_finish);
    }

    #[test]
    fn test_rejects_bad_exploration_constant() {
        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let hyperparams = MCTSHyperparameters {
                exploration_constant: bad,
                ..Default::default()
            };
            assert_matches!(
                hyperparams.validate(),
                Err(ConfigError::InvalidExplorationConstant(_))
            );
        }

        let zero = MCTSHyperparameters {
            exploration_constant: 0.0,
            ..Default::default()
        };
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let hyperparams = MCTSHyperparameters::from_json_str(
            r#"{"rollouts": 30, "simulation_policy": "random", "reward_scheme": "graded"}"#,
        )
        .unwrap();

        assert_eq!(hyperparams.rollouts, 30);
        assert_eq!(hyperparams.simulation_policy, SimulationPolicy::Random);
        assert_eq!(hyperparams.reward_scheme, RewardScheme::Graded);
        assert_eq!(hyperparams.seed, 2025);
    }

    #[test]
    fn test_negative_budget_is_a_parse_error() {
        assert_matches!(
            MCTSHyperparameters::from_json_str(r#"{"rollouts": -5}"#),
            Err(ConfigError::Parse(_))
        );
        assert_matches!(
            MCTSHyperparameters::from_json_str(r#"{"exploration_constant": -1.0}"#),
            Err(ConfigError::InvalidExplorationConstant(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mcts.json");
        std::fs::write(&path, r#"{"allow_finish": true, "seed": 7}"#).unwrap();

        let hyperparams = MCTSHyperparameters::load(&path).unwrap();
        assert!(hyperparams.allow_finish);
        assert_eq!(hyperparams.seed, 7);

        assert_matches!(
            MCTSHyperparameters::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        );
    }
}
