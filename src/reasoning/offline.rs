use crate::data::example::Example;
use crate::mcts::action::Action;
use crate::reasoning::{ProviderError, ProviderResponse, ReasoningProvider};

/// Network-free provider that describes each step from the example's own fields.
///
/// It never commits to an answer, which makes it useful for dry runs that only
/// inspect the shape of the search tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    fn observe(action: Action, example: &Example) -> Result<String, ProviderError> {
        match action {
            Action::QaReasoning => Ok(format!(
                "[QA_REASONING] Analyzing Q: {} with choices {:?}",
                example.question, example.choices
            )),
            Action::MetaReasoning => Ok(format!(
                "[META_REASONING] Hint: {} | Lecture: {}",
                example.hint, example.lecture
            )),
            Action::PicReasoning => Ok(format!(
                "[PIC_REASONING] Using image file: {} with Q: {}",
                example.image().unwrap_or("none"),
                example.question
            )),
            Action::Finish => Err(ProviderError::UnsupportedAction(action)),
        }
    }
}

impl ReasoningProvider for OfflineProvider {
    fn provide(
        &self,
        action: Action,
        example: &Example,
    ) -> Result<ProviderResponse, ProviderError> {
        let observation = Self::observe(action, example)?;
        Ok(ProviderResponse {
            example: example.with_appended_reasoning(&observation),
            answer: None,
            observation,
        })
    }
}
