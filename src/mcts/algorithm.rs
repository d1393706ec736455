//! Core Monte Carlo Tree Search loop over reasoning actions.
//!
//! One search run owns one tree rooted at the example's initial state and repeats
//! selection → expansion → simulation → backpropagation for the configured budget.
//! The answer is read from the most visited child of the root, the robust choice
//! when rewards are noisy. Runs for different examples share nothing, which is
//! what [`MctsEngine::search_batch`] relies on to run them in parallel.

use crate::data::example::Example;
use crate::mcts::hyperparameters::{ConfigError, MCTSHyperparameters};
use crate::mcts::mcts_result::{MCTSResult, NodeReport};
use crate::mcts::node::SearchTree;
use crate::mcts::selection::{
    backpropagate, most_visited_child, principal_variation, select_best_child, select_leaf,
};
use crate::mcts::simulation::{reward, rollout};
use crate::mcts::state::SearchState;
use crate::mcts::transitions::Transitions;
use crate::reasoning::ReasoningProvider;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tree and counters left behind by the rollout loop
pub struct SearchRun {
    pub tree: SearchTree,
    pub rollouts_completed: usize,
    pub cancelled: bool,
    pub transitions_derived: usize,
}

/// MCTS engine over reasoning actions
pub struct MctsEngine<'a> {
    provider: &'a dyn ReasoningProvider,
    hyperparams: MCTSHyperparameters,
}

impl<'a> MctsEngine<'a> {
    /// Creates an engine after validating `hyperparams`.
    pub fn new(
        provider: &'a dyn ReasoningProvider,
        hyperparams: MCTSHyperparameters,
    ) -> Result<Self, ConfigError> {
        hyperparams.validate()?;
        Ok(Self {
            provider,
            hyperparams,
        })
    }

    pub fn hyperparameters(&self) -> &MCTSHyperparameters {
        &self.hyperparams
    }

    /// Runs the full rollout budget on `example`.
    pub fn search(&self, example: &Example) -> MCTSResult {
        let never = AtomicBool::new(false);
        self.search_with_cancel(example, &never)
    }

    /// Like [`search`](Self::search), stopping early once `cancel` is set.
    ///
    /// The flag is checked before each selection phase; the tree built so far is
    /// kept and reported.
    pub fn search_with_cancel(&self, example: &Example, cancel: &AtomicBool) -> MCTSResult {
        let run = self.run(example, cancel);
        let result = extract_result(example, &run);

        log::debug!(
            "Example '{}': {} rollouts, {} nodes, best {:?} -> answer {:?} (correct: {})",
            example.id,
            run.rollouts_completed,
            run.tree.len(),
            result.actions,
            result.predicted_answer,
            result.correct
        );
        result
    }

    /// Searches every example independently, in parallel.
    ///
    /// Results come back in input order.
    pub fn search_batch(&self, examples: &[Example]) -> Vec<MCTSResult> {
        examples.par_iter().map(|example| self.search(example)).collect()
    }

    /// Executes the rollout loop and returns the tree it built.
    pub fn run(&self, example: &Example, cancel: &AtomicBool) -> SearchRun {
        let hp = &self.hyperparams;
        let root_state = SearchState::new(example.clone(), hp.catalog());
        let step_cap = hp.catalog().step_cap(&root_state);

        let mut tree = SearchTree::new(root_state);
        let mut transitions = Transitions::new(self.provider);
        let mut rng = StdRng::seed_from_u64(hp.seed);
        let mut rollouts_completed = 0;
        let mut cancelled = false;

        log::debug!(
            "Searching example '{}' with {} rollouts (c = {}, {:?}, {:?}, step cap {})",
            example.id,
            hp.rollouts,
            hp.exploration_constant,
            hp.simulation_policy,
            hp.reward_scheme,
            step_cap
        );

        for rollout_index in 0..hp.rollouts {
            if cancel.load(Ordering::Relaxed) {
                log::warn!(
                    "Search on example '{}' cancelled after {} rollouts",
                    example.id,
                    rollout_index
                );
                cancelled = true;
                break;
            }

            // Selection
            let leaf = select_leaf(&tree, hp.exploration_constant);

            // Expansion
            let mut node = leaf;
            if !tree.node(leaf).is_terminal() && tree.expand(leaf, &mut transitions) > 0 {
                if let Some(child) = select_best_child(&tree, leaf, hp.exploration_constant) {
                    node = child;
                }
            }

            // Simulation
            let end = rollout(
                &tree.node(node).state,
                hp.simulation_policy,
                step_cap,
                &mut transitions,
                &mut rng,
            );
            let value = reward(&end, hp.reward_scheme, step_cap);

            // Backpropagation
            backpropagate(&mut tree, node, value);
            rollouts_completed += 1;

            log::trace!(
                "Rollout {}: node {:?} via {:?} -> reward {}",
                rollout_index,
                node,
                end.used_actions(),
                value
            );
        }

        log::debug!(
            "Example '{}': {} transitions derived, {} served from memo",
            example.id,
            transitions.derived(),
            transitions.hits()
        );

        SearchRun {
            tree,
            rollouts_completed,
            cancelled,
            transitions_derived: transitions.derived(),
        }
    }
}

/// Reads the answer off the most visited root child, or the root itself when it has none.
pub fn extract_result(example: &Example, run: &SearchRun) -> MCTSResult {
    let tree = &run.tree;
    let root = tree.root();
    let chosen = most_visited_child(tree, root).unwrap_or(root);
    let state = &tree.node(chosen).state;

    let predicted_answer = match state.outcome() {
        Some(outcome) => outcome.predicted_answer,
        None => state.final_answer(),
    };

    MCTSResult {
        example_id: example.id.clone(),
        actions: state.used_actions().to_vec(),
        predicted_answer,
        correct: predicted_answer == Some(example.correct_index),
        trace: state.trace().to_vec(),
        terminal: state.is_terminal(),
        principal_variation: principal_variation(tree, root)
            .into_iter()
            .filter_map(|id| tree.node(id).action)
            .collect(),
        rollouts_completed: run.rollouts_completed,
        cancelled: run.cancelled,
        transitions_derived: run.transitions_derived,
        tree: NodeReport::snapshot(tree),
    }
}
