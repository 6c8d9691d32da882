//! Configuration resolution tests
//!
//! Uses serial_test to prevent ENV variable race conditions. Tests that
//! manipulate JRNL_ROOT are marked with #[serial].

use jrnl_common::config::{
    default_root_folder, env_flag, env_non_empty, resolve_root_folder, RootFolderInitializer,
    TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolved = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(resolved, default_root_folder());
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some("/from/toml".to_string()),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, &toml);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_empty_env_falls_through_to_toml() {
    env::set_var(ROOT_FOLDER_ENV, "   ");
    let toml = TomlConfig {
        root_folder: Some("/from/toml".to_string()),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, &toml);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");

    let resolved = resolve_root_folder(Some("/from/cli"), &TomlConfig::default());
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/from/cli"));
}

#[test]
#[serial]
fn test_env_flag_values() {
    let var = "JRNL_TEST_FLAG";

    for truthy in ["1", "true", "TRUE", "yes", "on"] {
        env::set_var(var, truthy);
        assert!(env_flag(var), "{} should be true", truthy);
    }
    for falsy in ["0", "false", "no", ""] {
        env::set_var(var, falsy);
        assert!(!env_flag(var), "{} should be false", falsy);
    }

    env::remove_var(var);
    assert!(!env_flag(var));
    assert!(env_non_empty(var).is_none());
}

#[test]
fn test_toml_file_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        provider = "ollama"
        ollama_base_url = "http://gpu-box:11434"
        ollama_model = "llama3.2:latest"
        "#,
    )
    .unwrap();

    let config = TomlConfig::from_file(&path).unwrap();
    assert_eq!(config.provider.as_deref(), Some("ollama"));
    assert_eq!(config.ollama_base_url.as_deref(), Some("http://gpu-box:11434"));
    assert!(config.openai_api_key.is_none());
}

#[test]
fn test_missing_toml_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(TomlConfig::from_file(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_root_folder_initializer_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("jrnl");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.root_folder(), root.as_path());
    assert_eq!(initializer.database_path(), root.join("jrnl.db"));
}
