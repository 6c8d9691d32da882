//! Local Ollama backend (`/api/chat`, non-streaming)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{error_body, ChatPrompt, LlmProvider, ProviderError};

pub struct OllamaProvider {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OllamaProvider {
    /// `base_url` is the server root, e.g. `http://localhost:11434`
    pub fn new(http_client: reqwest::Client, base_url: &str, model: &str, temperature: f32) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.to_string(),
            temperature,
        }
    }

    fn request_body(&self, prompt: &ChatPrompt) -> Value {
        json!({
            "model": self.model,
            "stream": false,
            "options": {"temperature": self.temperature},
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.human},
            ],
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        debug!(model = %self.model, endpoint = %self.endpoint, "Invoking Ollama chat");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| ProviderError::Parse("missing message.content".into()))?;

        debug!(chars = text.len(), "Ollama response received");
        Ok(text)
    }
}
