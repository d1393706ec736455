//! Reasoning actions and the catalog that decides which of them a state may take.

use crate::mcts::state::SearchState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reasoning step that can be applied to an example
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Reason over the question text and its choices
    QaReasoning,
    /// Reason over hint, lecture and metadata
    MetaReasoning,
    /// Reason over the attached image
    PicReasoning,
    /// Stop and commit to the current answer
    Finish,
}

impl Action {
    /// Reasoning actions in declaration order; `Finish` is handled by the catalog.
    pub const REASONING: [Action; 3] = [
        Action::QaReasoning,
        Action::MetaReasoning,
        Action::PicReasoning,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Action::QaReasoning => "QA_REASONING",
            Action::MetaReasoning => "META_REASONING",
            Action::PicReasoning => "PIC_REASONING",
            Action::Finish => "FINISH",
        }
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, Action::Finish)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Enumerates the actions a state may take, in a fixed order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCatalog {
    /// Offer an explicit `Finish` once some reasoning has been done
    pub allow_finish: bool,
}

impl ActionCatalog {
    pub fn new(allow_finish: bool) -> Self {
        Self { allow_finish }
    }

    /// Reasoning actions that apply to `state`'s example and have not been used.
    pub fn remaining_reasoning(&self, state: &SearchState) -> Vec<Action> {
        let example = state.example();
        Action::REASONING
            .iter()
            .copied()
            .filter(|action| !state.has_used(*action))
            .filter(|action| match action {
                Action::QaReasoning => true,
                Action::MetaReasoning => example.has_context_text(),
                Action::PicReasoning => example.image().is_some(),
                Action::Finish => false,
            })
            .collect()
    }

    /// Every action `state` may take next, in catalog order.
    ///
    /// Empty once the state is terminal or its reasoning actions are exhausted.
    /// `Finish` is only offered between the first and the last reasoning step.
    pub fn available_actions(&self, state: &SearchState) -> Vec<Action> {
        if state.is_terminal() {
            return Vec::new();
        }

        let mut actions = self.remaining_reasoning(state);
        if self.allow_finish && !actions.is_empty() && !state.used_actions().is_empty() {
            actions.push(Action::Finish);
        }
        actions
    }

    /// Upper bound on the number of steps any trajectory from the root can take.
    pub fn step_cap(&self, root: &SearchState) -> usize {
        let reasoning = self.remaining_reasoning(root).len() + root.used_actions().len();
        if self.allow_finish && reasoning > 1 {
            reasoning + 1
        } else {
            reasoning
        }
    }
}
