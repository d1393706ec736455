//! # Reasoning MCTS Library
//!
//! Monte Carlo Tree Search over reasoning actions for multiple-choice question answering.
//!
//! ## Features
//!
//! - **Search Engine**: UCB1 tree search where each edge is a reasoning step
//! - **Reasoning Providers**: chat-completions backend, offline templates, scripted replies
//! - **Data**: JSONL example loading with per-subject grouping
//! - **Recording**: JSONL result files and tree dumps
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reasoning_mcts::{
//!     data::Example,
//!     mcts::{MCTSHyperparameters, MctsEngine},
//!     reasoning::offline::OfflineProvider,
//! };
//!
//! let provider = OfflineProvider;
//! let engine = MctsEngine::new(&provider, MCTSHyperparameters::default())?;
//! let example = Example::new("0", "2+2=?", vec!["3".into(), "4".into()], 1);
//! let result = engine.search(&example);
//! println!("{:?}", result.predicted_answer);
//! # Ok::<(), reasoning_mcts::ReasoningMctsError>(())
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Examples and dataset loading
pub mod data;

/// Logger setup
pub mod logging;

/// Monte Carlo Tree Search engine
pub mod mcts;

/// Reasoning providers and prompt handling
pub mod reasoning;

/// Result files and reports
pub mod recording;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use data::{Example, Metadata};
pub use mcts::{
    Action, ConfigError, MCTSHyperparameters, MCTSResult, MctsEngine, RewardScheme,
    SimulationPolicy,
};
pub use reasoning::{ProviderError, ProviderResponse, ReasoningProvider};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the library
#[derive(Debug, thiserror::Error)]
pub enum ReasoningMctsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ReasoningMctsError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
