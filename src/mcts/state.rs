//! Search state: the actions applied to an example so far and what they produced.
//!
//! States are never mutated once built. Applying an action derives a fresh state
//! that copies the example, the used actions and the trace, then appends the new
//! step, so any number of tree nodes can derive from one ancestor safely.

use crate::data::example::Example;
use crate::mcts::action::{Action, ActionCatalog};
use crate::reasoning::ReasoningProvider;
use serde::{Deserialize, Serialize};

/// Final answer of a terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub predicted_answer: Option<usize>,
    pub correct: bool,
    pub trace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    example: Example,
    catalog: ActionCatalog,
    used_actions: Vec<Action>,
    trace: Vec<String>,
    latest_answer: Option<usize>,
    first_correct_step: Option<usize>,
    provider_failed: bool,
    terminal: bool,
    outcome: Option<SearchOutcome>,
}

impl SearchState {
    /// Root state for `example`; terminal immediately if no action applies.
    pub fn new(example: Example, catalog: ActionCatalog) -> Self {
        let mut state = Self {
            example,
            catalog,
            used_actions: Vec::new(),
            trace: Vec::new(),
            latest_answer: None,
            first_correct_step: None,
            provider_failed: false,
            terminal: false,
            outcome: None,
        };
        if catalog.remaining_reasoning(&state).is_empty() {
            state.mark_terminal();
        }
        state
    }

    pub fn example(&self) -> &Example {
        &self.example
    }

    pub fn catalog(&self) -> ActionCatalog {
        self.catalog
    }

    /// Applied actions in trajectory order
    pub fn used_actions(&self) -> &[Action] {
        &self.used_actions
    }

    pub fn has_used(&self, action: Action) -> bool {
        self.used_actions.contains(&action)
    }

    /// One entry per applied action, root to leaf
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub fn last_action(&self) -> Option<Action> {
        self.used_actions.last().copied()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn outcome(&self) -> Option<&SearchOutcome> {
        self.outcome.as_ref()
    }

    /// Most recent confident answer along the trajectory
    pub fn latest_answer(&self) -> Option<usize> {
        self.latest_answer
    }

    /// 1-based step at which the correct answer was first produced
    pub fn first_correct_step(&self) -> Option<usize> {
        self.first_correct_step
    }

    /// Whether a provider call failed somewhere along the trajectory
    pub fn provider_failed(&self) -> bool {
        self.provider_failed
    }

    /// Answer the trajectory stands by; a provider failure voids it.
    pub fn final_answer(&self) -> Option<usize> {
        if self.provider_failed {
            None
        } else {
            self.latest_answer
        }
    }

    pub fn is_correct(&self) -> bool {
        self.final_answer() == Some(self.example.correct_index)
    }

    pub fn available_actions(&self) -> Vec<Action> {
        self.catalog.available_actions(self)
    }

    /// Derives the state reached by taking `action`.
    ///
    /// The provider is only consulted for reasoning actions. A provider failure is
    /// recorded in the trace and voids the trajectory's answer and reward; it never
    /// aborts the search. Applying an action to a terminal state, or one that was already
    /// used, yields an unchanged copy.
    pub fn apply(
        &self,
        action: Action,
        provider: &dyn ReasoningProvider,
    ) -> (SearchState, Option<SearchOutcome>) {
        if self.terminal || self.has_used(action) {
            log::warn!(
                "Ignoring {} on example '{}': state is terminal or action already used",
                action,
                self.example.id
            );
            return (self.clone(), self.outcome.clone());
        }

        let mut next = self.clone();

        if action.is_finish() {
            let entry = match self.final_answer() {
                Some(index) => format!("{}: committing to answer {}", action, index),
                None => format!("{}: no confident answer", action),
            };
            next.record(action, entry);
            next.mark_terminal();
            let outcome = next.outcome.clone();
            return (next, outcome);
        }

        let entry = match provider.provide(action, &self.example) {
            Ok(response) => {
                let answer = response
                    .answer
                    .filter(|index| self.example.is_valid_choice(*index));
                if answer.is_none() && response.answer.is_some() {
                    log::warn!(
                        "{} returned answer {:?} outside the {} choices of example '{}'",
                        action,
                        response.answer,
                        self.example.choices.len(),
                        self.example.id
                    );
                }
                next.example = response.example;
                if let Some(index) = answer {
                    next.latest_answer = Some(index);
                    if index == next.example.correct_index && next.first_correct_step.is_none() {
                        next.first_correct_step = Some(self.used_actions.len() + 1);
                    }
                }
                format!("{}: {}", action, response.observation)
            }
            Err(e) => {
                log::warn!("{} failed on example '{}': {}", action, self.example.id, e);
                next.provider_failed = true;
                format!("{}: [provider failure: {}]", action, e)
            }
        };

        next.record(action, entry);
        if self.catalog.remaining_reasoning(&next).is_empty() {
            next.mark_terminal();
        }
        let outcome = next.outcome.clone();
        (next, outcome)
    }

    /// Closes a trajectory that ran out of steps without reaching a terminal state.
    pub fn exhausted(&self) -> SearchState {
        if self.terminal {
            return self.clone();
        }
        let mut closed = self.clone();
        closed.terminal = true;
        closed.outcome = Some(SearchOutcome {
            predicted_answer: None,
            correct: false,
            trace: closed.trace.clone(),
        });
        closed
    }

    fn record(&mut self, action: Action, entry: String) {
        self.used_actions.push(action);
        self.trace.push(entry);
        debug_assert_eq!(self.used_actions.len(), self.trace.len());
    }

    fn mark_terminal(&mut self) {
        self.terminal = true;
        self.outcome = Some(SearchOutcome {
            predicted_answer: self.final_answer(),
            correct: self.is_correct(),
            trace: self.trace.clone(),
        });
    }
}
