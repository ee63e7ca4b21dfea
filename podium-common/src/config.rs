//! Configuration loading and root folder resolution
//!
//! Resolution order for every value is:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never stops startup; it is logged and
//! the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "PODIUM_ROOT_FOLDER";

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "PODIUM_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "podium.db";

/// Upload folder name inside the root folder
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// Logging section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "podium_server=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of `config.toml`
///
/// Every field is optional so a partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub jwt_secret_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load the config file from the default search path
    ///
    /// Returns defaults (and logs a warning for parse errors) when no usable
    /// file exists.
    pub fn load() -> Self {
        let Some(path) = locate_config_file() else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => {
                debug!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        Self::from_toml_str(&content)
    }
}

/// Locate the config file for the current platform
///
/// `PODIUM_CONFIG` wins; otherwise `<config_dir>/podium/config.toml`, then
/// `/etc/podium/config.toml` on Linux.
fn locate_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_FILE_ENV) {
        let path = PathBuf::from(explicit);
        return path.exists().then_some(path);
    }

    let user_config = dirs::config_dir().map(|d| d.join("podium").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/podium/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub gemini_model: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            log_level: default_log_level(),
        }
    }
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/podium (or /var/lib/podium for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("podium"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/podium"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("podium"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/podium"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("podium"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\podium"))
    } else {
        PathBuf::from("./podium_data")
    }
}

/// Root folder resolver
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_value: toml_config.root_folder.clone(),
        }
    }

    /// Resolve the root folder; never fails
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder layout and hands out paths inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and the uploads folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.uploads_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.root_folder.join(UPLOADS_DIR_NAME)
    }
}

/// Resolve a secret value: environment variable first, then TOML
///
/// Empty or whitespace-only values are skipped.
pub fn resolve_secret(env_var_name: &str, toml_value: Option<&str>) -> Option<String> {
    if let Ok(value) = std::env::var(env_var_name) {
        if is_valid_secret(&value) {
            return Some(value);
        }
    }

    toml_value
        .filter(|value| is_valid_secret(value))
        .map(str::to_string)
}

/// A secret is valid when it is not blank
pub fn is_valid_secret(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_parses() {
        let config = TomlConfig::from_toml_str("port = 8080\n").unwrap();
        assert_eq!(config.port, Some(8080));
        assert!(config.root_folder.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("port = \"not a number\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_secret_is_invalid() {
        assert!(!is_valid_secret("   "));
        assert!(!is_valid_secret(""));
        assert!(is_valid_secret("abc"));
    }

    #[test]
    fn test_initializer_paths() {
        let init = RootFolderInitializer::new(PathBuf::from("/srv/podium"));
        assert_eq!(init.database_path(), PathBuf::from("/srv/podium/podium.db"));
        assert_eq!(init.uploads_path(), PathBuf::from("/srv/podium/uploads"));
    }
}
