//! Startup configuration for podium-server
//!
//! Values come from the command line (with `PODIUM_*` environment
//! fallbacks handled by clap), then the TOML config file, then compiled
//! defaults. Secrets are read from the environment before the TOML file.

use clap::Parser;
use podium_common::config::{resolve_secret, CompiledDefaults, RootFolderResolver, TomlConfig};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::PathBuf;
use tracing::{info, warn};

pub const JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";

/// Command-line arguments
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "podium-server", version, about = "Presentation coaching API server")]
pub struct Cli {
    /// Root folder holding the database and uploads
    #[arg(long, env = "PODIUM_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "PODIUM_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "PODIUM_BIND")]
    pub bind: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub jwt_secret: String,
    /// `None` disables remote analysis
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub log_level: String,
}

impl ServerConfig {
    pub fn resolve(cli: &Cli, toml_config: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder =
            RootFolderResolver::new(cli.root_folder.clone(), toml_config).resolve();

        let port = cli.port.or(toml_config.port).unwrap_or(defaults.port);

        let bind_address = cli
            .bind
            .clone()
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or(defaults.bind_address);

        let jwt_secret = match resolve_secret(JWT_SECRET_ENV, toml_config.jwt_secret_key.as_deref())
        {
            Some(secret) => secret,
            None => {
                warn!(
                    "{} not configured; using an ephemeral secret (tokens will not survive a restart)",
                    JWT_SECRET_ENV
                );
                ephemeral_secret()
            }
        };

        let gemini_api_key =
            resolve_secret(GEMINI_API_KEY_ENV, toml_config.gemini_api_key.as_deref());

        let gemini_model = resolve_secret(GEMINI_MODEL_ENV, toml_config.gemini_model.as_deref())
            .unwrap_or(defaults.gemini_model);

        Self {
            root_folder,
            port,
            bind_address,
            jwt_secret,
            gemini_api_key,
            gemini_model,
            log_level: toml_config.logging.level.clone(),
        }
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Log the resolved values, secrets excluded
    pub fn log_summary(&self) {
        info!("Root folder: {}", self.root_folder.display());
        info!("Listen address: {}", self.listen_address());
        match &self.gemini_api_key {
            Some(_) => info!("Media analysis: Gemini model {}", self.gemini_model),
            None => warn!(
                "{} not configured; media analysis will return fallback results",
                GEMINI_API_KEY_ENV
            ),
        }
    }
}

fn ephemeral_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [JWT_SECRET_ENV, GEMINI_API_KEY_ENV, GEMINI_MODEL_ENV, "PODIUM_ROOT_FOLDER"] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_cli_beats_toml() {
        clear_env();
        let toml_config = TomlConfig::from_toml_str("port = 8080\nbind_address = \"127.0.0.1\"\n").unwrap();
        let cli = Cli {
            port: Some(9090),
            ..Default::default()
        };

        let config = ServerConfig::resolve(&cli, &toml_config);
        assert_eq!(config.port, 9090);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.listen_address(), "127.0.0.1:9090");
    }

    #[test]
    #[serial]
    fn test_env_secret_beats_toml() {
        clear_env();
        std::env::set_var(JWT_SECRET_ENV, "from-env");
        let toml_config = TomlConfig::from_toml_str("jwt_secret_key = \"from-toml\"\n").unwrap();

        let config = ServerConfig::resolve(&Cli::default(), &toml_config);
        assert_eq!(config.jwt_secret, "from-env");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_defaults_without_configuration() {
        clear_env();
        let config = ServerConfig::resolve(&Cli::default(), &TomlConfig::default());

        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.jwt_secret.len(), 48);
    }
}
