//! Provider backed by OpenAI-compatible chat-completions endpoints.
//!
//! Text actions (question/choices and metadata) go to one endpoint, image reasoning
//! goes to a vision-capable one. Calls are blocking; the search runs one provider
//! call at a time per example. There are no retries here: a failed call surfaces
//! as a [`ProviderError`] and only costs that trajectory its reward.

use crate::data::example::Example;
use crate::mcts::action::Action;
use crate::reasoning::prompts::{meta_prompt, pic_prompt, qa_prompt, SYSTEM_PROMPT};
use crate::reasoning::response_parser::parse_reply;
use crate::reasoning::{ProviderError, ProviderResponse, ReasoningProvider};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEndpoint {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl ChatEndpoint {
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct ChatProviderConfig {
    pub text: ChatEndpoint,
    pub vision: ChatEndpoint,
    /// Directory image references are resolved against
    pub image_dir: PathBuf,
    pub timeout: Duration,
}

impl ChatProviderConfig {
    /// Reads endpoints and keys from the environment, with public defaults.
    pub fn from_env() -> Self {
        Self {
            text: ChatEndpoint {
                base_url: std::env::var("REASONING_BASE_URL")
                    .unwrap_or_else(|_| "https://api.deepseek.com".to_string()),
                model: std::env::var("REASONING_MODEL")
                    .unwrap_or_else(|_| "deepseek-reasoner".to_string()),
                api_key: std::env::var("REASONING_API_KEY").ok(),
            },
            vision: ChatEndpoint {
                base_url: std::env::var("VISION_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: std::env::var("VISION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                api_key: std::env::var("VISION_API_KEY").ok(),
            },
            image_dir: PathBuf::from("images"),
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct ChatProvider {
    config: ChatProviderConfig,
    http_client: HttpClient,
}

impl ChatProvider {
    pub fn new(config: ChatProviderConfig) -> Result<Self, ProviderError> {
        let http_client = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint_for(&self, action: Action) -> &ChatEndpoint {
        match action {
            Action::PicReasoning => &self.config.vision,
            _ => &self.config.text,
        }
    }

    /// Builds the `messages` array sent for `action`.
    pub fn build_messages(
        &self,
        action: Action,
        example: &Example,
    ) -> Result<Value, ProviderError> {
        match action {
            Action::QaReasoning => Ok(text_messages(&qa_prompt(example))),
            Action::MetaReasoning => Ok(text_messages(&meta_prompt(example))),
            Action::PicReasoning => {
                let image = example
                    .image()
                    .ok_or_else(|| ProviderError::Failed("example has no image".to_string()))?;
                let data_url = encode_image(&self.config.image_dir.join(image))?;
                Ok(json!([
                    {
                        "role": "user",
                        "content": [
                            {"type": "text", "text": pic_prompt(example)},
                            {"type": "image_url", "image_url": {"url": data_url}}
                        ]
                    }
                ]))
            }
            Action::Finish => Err(ProviderError::UnsupportedAction(action)),
        }
    }

    fn complete(&self, endpoint: &ChatEndpoint, messages: Value) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        struct Completion {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }

        let body = json!({
            "model": endpoint.model,
            "messages": messages,
            "stream": false,
        });

        let mut request = self.http_client.post(endpoint.completions_url()).json(&body);
        if let Some(api_key) = &endpoint.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: Completion = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

impl ReasoningProvider for ChatProvider {
    fn provide(
        &self,
        action: Action,
        example: &Example,
    ) -> Result<ProviderResponse, ProviderError> {
        let messages = self.build_messages(action, example)?;
        let endpoint = self.endpoint_for(action);

        log::debug!(
            "{} on example '{}' via {} ({})",
            action,
            example.id,
            endpoint.model,
            endpoint.base_url
        );

        let output = self.complete(endpoint, messages)?;
        response_from_output(example, &output)
    }
}

/// Turns raw model output into a response; a missing or unreadable answer fails the call.
fn response_from_output(
    example: &Example,
    output: &str,
) -> Result<ProviderResponse, ProviderError> {
    let reply = parse_reply(output);
    let answer = reply.confident_answer().map_err(ProviderError::Failed)?;

    Ok(ProviderResponse {
        example: example.with_appended_reasoning(&reply.reasoning),
        answer,
        observation: reply.reasoning,
    })
}

fn text_messages(prompt: &str) -> Value {
    json!([
        {"role": "system", "content": SYSTEM_PROMPT},
        {"role": "user", "content": prompt}
    ])
}

/// Reads an image file into a base64 data URL.
pub fn encode_image(path: &Path) -> Result<String, ProviderError> {
    let bytes = std::fs::read(path).map_err(|source| ProviderError::Image {
        path: path.display().to_string(),
        source,
    })?;

    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    fn provider(image_dir: &Path) -> ChatProvider {
        let endpoint = ChatEndpoint {
            base_url: "http://127.0.0.1:9/".to_string(),
            model: "test-model".to_string(),
            api_key: None,
        };
        ChatProvider::new(ChatProviderConfig {
            text: endpoint.clone(),
            vision: ChatEndpoint {
                model: "vision-model".to_string(),
                ..endpoint
            },
            image_dir: image_dir.to_path_buf(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    fn example() -> Example {
        Example::new("c", "Which is a mammal?", vec!["cat".into(), "trout".into()], 0)
    }

    #[test]
    fn test_completions_url() {
        let endpoint = ChatEndpoint {
            base_url: "https://api.example.com/v1/".to_string(),
            model: "m".to_string(),
            api_key: None,
        };
        assert_eq!(endpoint.completions_url(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_text_messages_have_system_and_user_roles() {
        let dir = tempdir().unwrap();
        let messages = provider(dir.path())
            .build_messages(Action::QaReasoning, &example())
            .unwrap();

        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert!(messages[1]["content"]
            .as_str()
            .unwrap()
            .contains("Which is a mammal?"));
    }

    #[test]
    fn test_pic_messages_embed_image() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("5.png"), [0x89, b'P', b'N', b'G']).unwrap();
        let provider = provider(dir.path());

        let messages = provider
            .build_messages(Action::PicReasoning, &example().with_image("5.png"))
            .unwrap();
        let url = messages[0]["content"][1]["image_url"]["url"].as_str().unwrap();

        assert_eq!(
            url,
            format!("data:image/png;base64,{}", STANDARD.encode([0x89, b'P', b'N', b'G']))
        );
        assert_eq!(provider.endpoint_for(Action::PicReasoning).model, "vision-model");
        assert_eq!(provider.endpoint_for(Action::MetaReasoning).model, "test-model");
    }

    #[test]
    fn test_missing_image_fails_before_any_request() {
        let dir = tempdir().unwrap();
        let result = provider(dir.path())
            .provide(Action::PicReasoning, &example().with_image("absent.jpg"));
        assert_matches!(result, Err(ProviderError::Image { .. }));
    }

    #[test]
    fn test_reply_answer_handling() {
        let ok = response_from_output(&example(), "REASONING: cats have fur\nANSWER: 0").unwrap();
        assert_eq!(ok.answer, Some(0));
        assert_eq!(ok.observation, "cats have fur");
        assert_eq!(ok.example.reasoning, "cats have fur");

        let unsure =
            response_from_output(&example(), "REASONING: no idea\nANSWER: null").unwrap();
        assert_eq!(unsure.answer, None);

        assert_matches!(
            response_from_output(&example(), "REASONING: it is the cat"),
            Err(ProviderError::Failed(_))
        );
        assert_matches!(
            response_from_output(&example(), "REASONING: cat\nANSWER: option A"),
            Err(ProviderError::Failed(msg)) if msg.contains("option A")
        );
    }

    #[test]
    fn test_finish_is_rejected() {
        let dir = tempdir().unwrap();
        assert_matches!(
            provider(dir.path()).provide(Action::Finish, &example()),
            Err(ProviderError::UnsupportedAction(Action::Finish))
        );
    }
}
