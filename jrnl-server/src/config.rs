//! Service configuration
//!
//! Each setting resolves CLI → environment → TOML → compiled default. clap
//! covers the first two tiers (`#[arg(env = ...)]`); `jrnl_common::config`
//! provides the TOML layer.

use clap::Parser;
use jrnl_common::config::{env_flag, resolve_root_folder, TomlConfig};
use jrnl_common::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::ProviderKind;

pub const DEFAULT_BIND: &str = "127.0.0.1:5740";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Command-line arguments
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "jrnl-server")]
#[command(about = "Journaling service with LLM mood analysis")]
#[command(version)]
pub struct Cli {
    /// Folder holding jrnl.db (env: JRNL_ROOT)
    #[arg(long)]
    pub root_folder: Option<String>,

    /// Listen address
    #[arg(long, env = "JRNL_BIND")]
    pub bind: Option<String>,

    /// LLM backend: openai or ollama
    #[arg(long, env = "JRNL_PROVIDER")]
    pub provider: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "OLLAMA_BASE_URL")]
    pub ollama_base_url: Option<String>,

    #[arg(long, env = "OLLAMA_MODEL")]
    pub ollama_model: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "JRNL_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Provider request timeout in seconds
    #[arg(long, env = "JRNL_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
}

/// Provider settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub kind: ProviderKind,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub bind: SocketAddr,
    pub llm: LlmConfig,
}

impl ServiceConfig {
    /// Merge CLI/env arguments over the TOML file and defaults
    pub fn resolve(cli: &Cli, toml: &TomlConfig) -> Result<Self> {
        let root_folder = resolve_root_folder(cli.root_folder.as_deref(), toml);

        let bind_str = pick(&cli.bind, &toml.bind).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind_str, e)))?;

        let kind = resolve_provider_kind(cli.provider.as_deref(), toml.provider.as_deref())?;

        let temperature = cli
            .temperature
            .or(toml.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(Error::Config(format!(
                "Temperature {} outside 0.0..=2.0",
                temperature
            )));
        }

        let timeout_secs = cli
            .request_timeout_secs
            .or(toml.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }

        let llm = LlmConfig {
            kind,
            openai_api_key: pick(&cli.openai_api_key, &toml.openai_api_key),
            openai_model: pick(&cli.openai_model, &toml.openai_model)
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: pick(&cli.openai_base_url, &toml.openai_base_url)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ollama_base_url: pick(&cli.ollama_base_url, &toml.ollama_base_url)
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            ollama_model: pick(&cli.ollama_model, &toml.ollama_model)
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            temperature,
            request_timeout: Duration::from_secs(timeout_secs),
        };

        if llm.kind == ProviderKind::OpenAi && llm.openai_api_key.is_none() {
            return Err(Error::Config(
                "OpenAI provider selected but OPENAI_API_KEY is not set".into(),
            ));
        }

        Ok(Self {
            root_folder,
            bind,
            llm,
        })
    }
}

/// Explicit provider (CLI or JRNL_PROVIDER) → USE_OPENAI / JRNL_ENV=production → TOML → Ollama
fn resolve_provider_kind(explicit: Option<&str>, toml: Option<&str>) -> Result<ProviderKind> {
    if let Some(value) = explicit {
        return parse_kind(value);
    }

    let production = std::env::var("JRNL_ENV")
        .map(|v| v.trim().eq_ignore_ascii_case("production"))
        .unwrap_or(false);
    if env_flag("USE_OPENAI") || production {
        return Ok(ProviderKind::OpenAi);
    }

    match toml {
        Some(value) => parse_kind(value),
        None => Ok(ProviderKind::Ollama),
    }
}

fn parse_kind(value: &str) -> Result<ProviderKind> {
    ProviderKind::parse(value).ok_or_else(|| {
        Error::Config(format!(
            "Unknown provider '{}' (expected openai or ollama)",
            value
        ))
    })
}

/// First non-empty value of CLI/env then TOML
fn pick(cli: &Option<String>, toml: &Option<String>) -> Option<String> {
    cli.iter()
        .chain(toml.iter())
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}
