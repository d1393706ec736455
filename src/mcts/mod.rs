pub mod action;
pub mod algorithm;
pub mod hyperparameters;
pub mod mcts_result;
pub mod node;
pub mod selection;
pub mod simulation;
pub mod state;
pub mod transitions;

pub use action::{Action, ActionCatalog};
pub use algorithm::MctsEngine;
pub use hyperparameters::{ConfigError, MCTSHyperparameters, RewardScheme, SimulationPolicy};
pub use mcts_result::{MCTSResult, NodeReport};
pub use state::{SearchOutcome, SearchState};
