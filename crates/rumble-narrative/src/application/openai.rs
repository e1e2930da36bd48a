//! OpenAI-compatible narrator client.

use async_trait::async_trait;
use rumble_core::error::RoundError;
use rumble_core::narrator::Narrator;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const MAX_TOKENS: u32 = 100;
const TEMPERATURE: f32 = 0.7;

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// Bearer token.
    pub api_key: String,
    /// API base URL, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Model name.
    pub model: String,
}

impl OpenAiConfig {
    /// Settings for the public endpoint and default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Instruction wrapped around every event description.
#[must_use]
pub fn instruction_for(description: &str) -> String {
    format!("Generate a dramatic sentence for this battle royale event: {description}")
}

/// Narrator backed by a chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiNarrator {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiNarrator {
    /// Creates a narrator with a fresh HTTP client.
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

fn failure(message: impl Into<String>) -> RoundError {
    RoundError::CollaboratorFailure(message.into())
}

#[async_trait]
impl Narrator for OpenAiNarrator {
    #[instrument(skip(self), fields(model = %self.config.model))]
    async fn generate_line(&self, prompt: &str) -> Result<String, RoundError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: instruction_for(prompt),
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| failure(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("chat http={}", status.as_u16())));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| failure(format!("malformed response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|line| !line.is_empty())
            .ok_or_else(|| failure("response contained no text"))
    }
}
