//! Configuration loading and root folder resolution
//!
//! Every setting resolves with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment parsing belong to the binary; this module
//! provides the TOML layer, the root folder defaults and small env helpers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the SQLite database inside the root folder
pub const DATABASE_FILE_NAME: &str = "jrnl.db";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "JRNL_ROOT";

/// Contents of `config.toml`
///
/// All fields are optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Folder holding the database
    pub root_folder: Option<String>,
    /// HTTP listen address, e.g. "127.0.0.1:5740"
    pub bind: Option<String>,
    /// LLM backend: "openai" or "ollama"
    pub provider: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub ollama_base_url: Option<String>,
    pub ollama_model: Option<String>,
    /// Sampling temperature for both backends
    pub temperature: Option<f32>,
    /// Per-request provider timeout
    pub request_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

/// Load the TOML config from the platform config location
///
/// Missing file is not an error: defaults are returned. A file that exists
/// but fails to parse is reported.
pub fn load_toml_config() -> Result<TomlConfig> {
    match find_config_file() {
        Some(path) => {
            info!("Loading config file: {}", path.display());
            TomlConfig::from_file(&path)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Locate `config.toml`
///
/// Checks `<config_dir>/jrnl/config.toml` first, then `/etc/jrnl/config.toml`
/// on Linux.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("jrnl").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/jrnl/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the root folder (CLI → ENV → TOML → OS default)
pub fn resolve_root_folder(cli_arg: Option<&str>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Some(path) = env_non_empty(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    if let Some(path) = toml.root_folder.as_deref() {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("jrnl"))
        .unwrap_or_else(|| PathBuf::from("./jrnl_data"))
}

/// Prepares the resolved root folder for use
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}

/// Read an environment variable, treating empty/whitespace values as unset
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a boolean flag ("1", "true", "yes", "on"; case-insensitive)
pub fn env_flag(var: &str) -> bool {
    env_non_empty(var)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
