//! Canned-response provider for tests and reproducible experiments.

use crate::data::example::Example;
use crate::mcts::action::Action;
use crate::reasoning::{ProviderError, ProviderResponse, ReasoningProvider};
use std::collections::HashMap;
use std::sync::Mutex;

/// Reply returned for one action kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Answer(Option<usize>),
    Fail(String),
}

impl ScriptedReply {
    pub fn answer(index: usize) -> Self {
        ScriptedReply::Answer(Some(index))
    }

    pub fn no_answer() -> Self {
        ScriptedReply::Answer(None)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedReply::Fail(message.into())
    }
}

/// Provider that answers from a fixed table and records every call it receives.
#[derive(Debug)]
pub struct ScriptedProvider {
    replies: HashMap<Action, ScriptedReply>,
    fallback: ScriptedReply,
    history: Mutex<Vec<(Action, String)>>,
}

impl ScriptedProvider {
    pub fn new(fallback: ScriptedReply) -> Self {
        Self {
            replies: HashMap::new(),
            fallback,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Never confident, never failing
    pub fn silent() -> Self {
        Self::new(ScriptedReply::no_answer())
    }

    /// Fails every call with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(ScriptedReply::fail(message))
    }

    pub fn with_reply(mut self, action: Action, reply: ScriptedReply) -> Self {
        self.replies.insert(action, reply);
        self
    }

    /// Number of calls received so far
    pub fn calls(&self) -> usize {
        self.history().len()
    }

    /// Every call as `(action, reasoning the example carried)`
    pub fn history(&self) -> Vec<(Action, String)> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ReasoningProvider for ScriptedProvider {
    fn provide(
        &self,
        action: Action,
        example: &Example,
    ) -> Result<ProviderResponse, ProviderError> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((action, example.reasoning.clone()));

        match self.replies.get(&action).unwrap_or(&self.fallback) {
            ScriptedReply::Answer(answer) => {
                let observation = match answer {
                    Some(index) => format!("scripted step, answer {}", index),
                    None => "scripted step, no answer".to_string(),
                };
                Ok(ProviderResponse {
                    example: example.with_appended_reasoning(action.label()),
                    answer: *answer,
                    observation,
                })
            }
            ScriptedReply::Fail(message) => Err(ProviderError::Failed(message.clone())),
        }
    }
}
