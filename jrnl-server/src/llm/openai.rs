//! OpenAI-compatible chat completions backend

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{error_body, ChatPrompt, LlmProvider, ProviderError};

pub struct OpenAiProvider {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        api_key: String,
        model: &str,
        temperature: f32,
    ) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            temperature,
        }
    }

    fn request_body(&self, prompt: &ChatPrompt) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.human},
            ],
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        debug!(model = %self.model, endpoint = %self.endpoint, "Invoking OpenAI chat completion");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
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

        let payload: Value = response.json().await?;
        let text = extract_completion_text(&payload)
            .ok_or_else(|| ProviderError::Parse("missing choices[0].message.content".into()))?;

        debug!(chars = text.len(), "OpenAI response received");
        Ok(text)
    }
}

/// Pull the assistant text out of a chat completion payload
///
/// Accepts plain string content, content part arrays, and the legacy
/// `choices[0].text` shape.
pub fn extract_completion_text(payload: &Value) -> Option<String> {
    if let Some(content) = payload.pointer("/choices/0/message/content") {
        match content {
            Value::String(s) => return Some(s.clone()),
            Value::Array(parts) => {
                let text: String = parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect();
                return Some(text);
            }
            _ => {}
        }
    }

    payload
        .pointer("/choices/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
}
