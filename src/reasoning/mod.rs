//! Reasoning providers: the pluggable functions that execute an action against an example.
//!
//! The search only depends on [`ReasoningProvider`]. Providers may be slow and may
//! talk to remote services; they must not mutate their input and must report a
//! failure as a [`ProviderError`] rather than panic.

pub mod chat_client;
pub mod offline;
pub mod prompts;
pub mod response_parser;
pub mod scripted;

use crate::data::example::Example;
use crate::mcts::action::Action;

/// What a provider hands back for one action
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    /// Copy of the input with the new reasoning appended
    pub example: Example,
    /// Candidate answer index, `None` when the provider is not confident
    pub answer: Option<usize>,
    /// Short description of the step, recorded in the trace
    pub observation: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response carried no message content")]
    EmptyResponse,

    #[error("could not read image '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not handled by this provider")]
    UnsupportedAction(Action),

    #[error("{0}")]
    Failed(String),
}

/// Executes reasoning actions against examples.
///
/// Implementations are shared between parallel searches, hence `Send + Sync`.
pub trait ReasoningProvider: Send + Sync {
    fn provide(&self, action: Action, example: &Example) -> Result<ProviderResponse, ProviderError>;
}
