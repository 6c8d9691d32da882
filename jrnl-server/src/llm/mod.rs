//! LLM provider backends
//!
//! One trait, two implementations (hosted OpenAI-compatible chat completions
//! and a local Ollama server), selected once at startup.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::LlmConfig;

pub mod ollama;
pub mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

const USER_AGENT: &str = concat!("jrnl-server/", env!("CARGO_PKG_VERSION"));

/// A rendered chat prompt: one system message and one human message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub human: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, human: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            human: human.into(),
        }
    }
}

/// Provider invocation errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected provider response: {0}")]
    Parse(String),

    #[error("Provider configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Text generation backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Backend identifier ("openai", "ollama")
    fn name(&self) -> &'static str;

    /// Model the backend is configured to use
    fn model(&self) -> &str;

    /// Send the prompt and return the raw assistant text
    ///
    /// Blank text is returned as-is; callers decide what it means.
    /// No retry: errors propagate to the caller.
    async fn invoke(&self, prompt: &ChatPrompt) -> Result<String, ProviderError>;
}

/// Which backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
}

impl ProviderKind {
    /// Case-insensitive parse of "openai" / "ollama"
    pub fn parse(value: &str) -> Option<ProviderKind> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "ollama" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construct the configured backend
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let provider: Arc<dyn LlmProvider> = match config.kind {
        ProviderKind::OpenAi => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                ProviderError::Config("OpenAI provider selected but no API key configured".into())
            })?;
            Arc::new(OpenAiProvider::new(
                http_client(config.request_timeout)?,
                &config.openai_base_url,
                api_key,
                &config.openai_model,
                config.temperature,
            ))
        }
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(
            http_client(config.request_timeout)?,
            &config.ollama_base_url,
            &config.ollama_model,
            config.temperature,
        )),
    };

    info!(
        provider = provider.name(),
        model = provider.model(),
        timeout_secs = config.request_timeout.as_secs(),
        "LLM provider configured"
    );

    Ok(provider)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Config(e.to_string()))
}

/// Read the response body as text for error reporting, truncated
async fn error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    body.chars().take(500).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(kind: ProviderKind) -> LlmConfig {
        LlmConfig {
            kind,
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse(" ollama "), Some(ProviderKind::Ollama));
        assert_eq!(ProviderKind::parse("gemini"), None);
    }

    #[test]
    fn test_openai_without_key_is_config_error() {
        let result = build_provider(&test_config(ProviderKind::OpenAi));
        assert!(matches!(result, Err(ProviderError::Config(_))));
    }

    #[test]
    fn test_build_ollama_provider() {
        let provider = build_provider(&test_config(ProviderKind::Ollama)).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama3.2:latest");
    }

    #[test]
    fn test_build_openai_provider_with_key() {
        let config = LlmConfig {
            kind: ProviderKind::OpenAi,
            openai_api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o-mini");
    }
}
