use crate::mcts::action::Action;
use crate::mcts::state::SearchState;
use crate::reasoning::ReasoningProvider;
use std::collections::HashMap;

/// Per-run memo of derived states, keyed by trajectory.
///
/// Expansion and rollouts frequently reach the same trajectory (a rollout from `A`
/// applies `B`; later `A` is expanded into `A → B`). Both derive the state through
/// this memo, so each (trajectory, action) pair reaches the provider at most once
/// per search run. Keys are ordered trajectories because accumulated reasoning
/// depends on the order in which actions were taken.
pub struct Transitions<'p> {
    provider: &'p dyn ReasoningProvider,
    memo: HashMap<Vec<Action>, SearchState>,
    hits: usize,
}

impl<'p> Transitions<'p> {
    pub fn new(provider: &'p dyn ReasoningProvider) -> Self {
        Self {
            provider,
            memo: HashMap::new(),
            hits: 0,
        }
    }

    /// State reached from `state` by `action`, computed at most once.
    pub fn apply(&mut self, state: &SearchState, action: Action) -> SearchState {
        let mut key = state.used_actions().to_vec();
        key.push(action);

        if let Some(known) = self.memo.get(&key) {
            self.hits += 1;
            return known.clone();
        }

        let (next, _) = state.apply(action, self.provider);
        self.memo.insert(key, next.clone());
        next
    }

    /// Distinct transitions derived so far
    pub fn derived(&self) -> usize {
        self.memo.len()
    }

    /// Transitions served from the memo
    pub fn hits(&self) -> usize {
        self.hits
    }
}
