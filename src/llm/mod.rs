pub mod credentials;

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::config::LlmConfig;
use crate::error::LlmError;

pub use credentials::CredentialPool;

/// A chat-completion service that authenticates with one key per call.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, api_key: &str, system_prompt: &str, user_input: &str) -> Result<String, LlmError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Requests are built with `async-openai` types and sent with `reqwest` so
/// the raw status is available: quota signals must be told apart from other
/// failures to drive key rotation.
#[derive(Clone)]
pub struct LLMClient {
    http: Client,
    base_url: String,
    pub model: String,
    temperature: f32,
}

impl LLMClient {
    pub fn new(base_url: String, model: String, temperature: f32) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config.base_url.clone(), config.model.clone(), config.temperature)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for LLMClient {
    async fn chat(&self, api_key: &str, system_prompt: &str, user_input: &str) -> Result<String, LlmError> {
        info!("🤖 Sending request to LLM (Model: {})...", self.model);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages([
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default().content(system_prompt).build()?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default().content(user_input).build()?,
                ),
            ])
            .build()?;

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::from_response(status.as_u16(), &body));
        }

        info!("🤖 LLM Response received.");
        extract_content(&body)
    }
}

/// Pull `choices[0].message.content` out of a completion body.
pub fn extract_content(body: &str) -> Result<String, LlmError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LlmError::Api(format!("malformed completion response: {}", e)))?;

    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::Api("completion has no message content".to_string()))
}
