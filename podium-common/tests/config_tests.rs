//! Tests for configuration resolution and graceful degradation
//!
//! Uses serial_test to prevent environment variable races: tests touching
//! PODIUM_* variables are marked #[serial].

use podium_common::config::{
    resolve_secret, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.port, 3000);
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.root_folder.to_string_lossy().contains("podium"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new(None, &TomlConfig::default());
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/podium-env-folder");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/podium-toml-folder")),
        ..Default::default()
    };
    let root_folder = RootFolderResolver::new(None, &toml).resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/podium-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/podium-env-folder");

    let resolver = RootFolderResolver::new(
        Some(PathBuf::from("/tmp/podium-cli-folder")),
        &TomlConfig::default(),
    );

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/podium-cli-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_uses_toml_when_env_missing() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig::from_toml_str("root_folder = \"/srv/podium\"").unwrap();
    let root_folder = RootFolderResolver::new(None, &toml).resolve();

    assert_eq!(root_folder, PathBuf::from("/srv/podium"));
}

#[test]
#[serial]
fn test_secret_env_beats_toml_and_blank_is_skipped() {
    env::set_var("PODIUM_TEST_SECRET", "from-env");
    assert_eq!(
        resolve_secret("PODIUM_TEST_SECRET", Some("from-toml")).as_deref(),
        Some("from-env")
    );

    env::set_var("PODIUM_TEST_SECRET", "   ");
    assert_eq!(
        resolve_secret("PODIUM_TEST_SECRET", Some("from-toml")).as_deref(),
        Some("from-toml")
    );

    env::remove_var("PODIUM_TEST_SECRET");
    assert!(resolve_secret("PODIUM_TEST_SECRET", Some("")).is_none());
}

#[test]
fn test_full_toml_document() {
    let toml = TomlConfig::from_toml_str(
        r#"
        root_folder = "/srv/podium"
        port = 8080
        bind_address = "127.0.0.1"
        jwt_secret_key = "secret"
        gemini_api_key = "key"
        gemini_model = "gemini-1.5-pro"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(toml.port, Some(8080));
    assert_eq!(toml.bind_address.as_deref(), Some("127.0.0.1"));
    assert_eq!(toml.gemini_model.as_deref(), Some("gemini-1.5-pro"));
    assert_eq!(toml.logging.level, "debug");
}

#[test]
fn test_load_from_missing_file_is_error() {
    let result = TomlConfig::load_from(&PathBuf::from("/nonexistent/podium/config.toml"));
    assert!(result.is_err());
}

#[test]
fn test_initializer_creates_directory_idempotently() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("podium-root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert!(initializer.uploads_path().is_dir());
}
