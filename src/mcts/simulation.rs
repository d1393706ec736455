//! Rollouts from a tree node and the rewards they earn.

use crate::mcts::hyperparameters::{RewardScheme, SimulationPolicy};
use crate::mcts::state::SearchState;
use crate::mcts::transitions::Transitions;
use rand::prelude::IndexedRandom;
use rand::Rng;

/// Plays `start` forward until it is terminal or `step_cap` steps were taken.
///
/// A state still open after the cap is closed with no answer.
pub fn rollout<R: Rng + ?Sized>(
    start: &SearchState,
    policy: SimulationPolicy,
    step_cap: usize,
    transitions: &mut Transitions<'_>,
    rng: &mut R,
) -> SearchState {
    let mut current = start.clone();

    for _ in 0..step_cap {
        if current.is_terminal() {
            return current;
        }
        let actions = current.available_actions();
        let next_action = match policy {
            SimulationPolicy::Exhaustive => actions.first().copied(),
            SimulationPolicy::Random => actions.choose(rng).copied(),
        };
        match next_action {
            Some(action) => current = transitions.apply(&current, action),
            None => break,
        }
    }

    if current.is_terminal() {
        current
    } else {
        log::trace!(
            "Rollout stopped after {} steps without a terminal state",
            current.used_actions().len()
        );
        current.exhausted()
    }
}

/// Reward of a finished rollout.
///
/// `Binary` scores the final answer. `Graded` pays `2^(step_cap - i)` once, for the
/// first step `i` that produced the correct answer, so reaching it earlier is worth
/// strictly more. A trajectory whose provider call failed earns nothing under
/// either scheme.
pub fn reward(state: &SearchState, scheme: RewardScheme, step_cap: usize) -> f64 {
    if state.provider_failed() {
        return 0.0;
    }
    let correct = state.outcome().is_some_and(|outcome| outcome.correct);

    match scheme {
        RewardScheme::Binary => {
            if correct {
                1.0
            } else {
                0.0
            }
        }
        RewardScheme::Graded => match state.first_correct_step() {
            Some(step) => 2f64.powi(step_cap.saturating_sub(step) as i32),
            None => 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example::Example;
    use crate::mcts::action::{Action, ActionCatalog};
    use crate::reasoning::scripted::{ScriptedProvider, ScriptedReply};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn example() -> Example {
        Example::new("r", "2+2=?", vec!["3".into(), "4".into(), "5".into()], 1)
            .with_hint("h")
            .with_image("1.png")
    }

    #[test]
    fn test_exhaustive_rollout_follows_catalog_order() {
        let provider = ScriptedProvider::silent();
        let mut transitions = Transitions::new(&provider);
        let mut rng = StdRng::seed_from_u64(1);
        let root = SearchState::new(example(), ActionCatalog::default());

        let end = rollout(&root, SimulationPolicy::Exhaustive, 3, &mut transitions, &mut rng);
        assert!(end.is_terminal());
        assert_eq!(
            end.used_actions(),
            &[Action::QaReasoning, Action::MetaReasoning, Action::PicReasoning]
        );
    }

    #[test]
    fn test_random_rollout_is_reproducible() {
        let provider = ScriptedProvider::silent();
        let root = SearchState::new(example(), ActionCatalog::new(true));

        let run = |seed: u64| {
            let mut transitions = Transitions::new(&provider);
            let mut rng = StdRng::seed_from_u64(seed);
            rollout(&root, SimulationPolicy::Random, 4, &mut transitions, &mut rng)
                .used_actions()
                .to_vec()
        };

        assert_eq!(run(42), run(42));
        let trajectory = run(7);
        assert!(!trajectory.is_empty() && trajectory.len() <= 4);
    }

    #[test]
    fn test_step_cap_closes_without_answer() {
        let provider =
            ScriptedProvider::silent().with_reply(Action::QaReasoning, ScriptedReply::answer(1));
        let mut transitions = Transitions::new(&provider);
        let mut rng = StdRng::seed_from_u64(1);
        let root = SearchState::new(example(), ActionCatalog::default());

        let end = rollout(&root, SimulationPolicy::Exhaustive, 1, &mut transitions, &mut rng);
        assert!(end.is_terminal());
        assert_eq!(end.used_actions().len(), 1);
        assert_eq!(end.outcome().unwrap().predicted_answer, None);
        assert_eq!(reward(&end, RewardScheme::Binary, 3), 0.0);
    }

    #[test]
    fn test_failed_trajectory_earns_nothing() {
        let provider = ScriptedProvider::silent()
            .with_reply(Action::QaReasoning, ScriptedReply::answer(1))
            .with_reply(Action::MetaReasoning, ScriptedReply::fail("timeout"));
        let mut transitions = Transitions::new(&provider);
        let mut rng = StdRng::seed_from_u64(1);
        let root = SearchState::new(example(), ActionCatalog::default());

        let end = rollout(&root, SimulationPolicy::Exhaustive, 3, &mut transitions, &mut rng);
        assert!(end.is_terminal());
        assert_eq!(end.first_correct_step(), Some(1));
        assert_eq!(reward(&end, RewardScheme::Binary, 3), 0.0);
        assert_eq!(reward(&end, RewardScheme::Graded, 3), 0.0);
    }

    #[test]
    fn test_binary_reward() {
        let provider =
            ScriptedProvider::silent().with_reply(Action::PicReasoning, ScriptedReply::answer(1));
        let mut transitions = Transitions::new(&provider);
        let mut rng = StdRng::seed_from_u64(1);
        let root = SearchState::new(example(), ActionCatalog::default());

        let end = rollout(&root, SimulationPolicy::Exhaustive, 3, &mut transitions, &mut rng);
        assert_eq!(reward(&end, RewardScheme::Binary, 3), 1.0);
        assert_eq!(reward(&root, RewardScheme::Binary, 3), 0.0);
    }

    #[test]
    fn test_graded_reward_prefers_early_correct_answers() {
        let provider =
            ScriptedProvider::silent().with_reply(Action::QaReasoning, ScriptedReply::answer(1));
        let root = SearchState::new(example(), ActionCatalog::default());

        let qa_first = root
            .apply(Action::QaReasoning, &provider)
            .0
            .apply(Action::MetaReasoning, &provider)
            .0
            .apply(Action::PicReasoning, &provider)
            .0;
        let qa_last = root
            .apply(Action::PicReasoning, &provider)
            .0
            .apply(Action::MetaReasoning, &provider)
            .0
            .apply(Action::QaReasoning, &provider)
            .0;

        assert_eq!(reward(&qa_first, RewardScheme::Graded, 3), 4.0);
        assert_eq!(reward(&qa_last, RewardScheme::Graded, 3), 1.0);
    }

    #[test]
    fn test_graded_reward_counts_first_correct_only() {
        let provider = ScriptedProvider::silent()
            .with_reply(Action::QaReasoning, ScriptedReply::answer(1))
            .with_reply(Action::MetaReasoning, ScriptedReply::answer(1))
            .with_reply(Action::PicReasoning, ScriptedReply::answer(0));
        let root = SearchState::new(example(), ActionCatalog::default());

        let end = root
            .apply(Action::QaReasoning, &provider)
            .0
            .apply(Action::MetaReasoning, &provider)
            .0
            .apply(Action::PicReasoning, &provider)
            .0;

        // Final answer is wrong, the first correct step still earns its single bonus
        assert!(!end.outcome().unwrap().correct);
        assert_eq!(reward(&end, RewardScheme::Graded, 3), 4.0);
        assert_eq!(reward(&end, RewardScheme::Binary, 3), 0.0);
    }
}
