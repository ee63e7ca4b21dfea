//! podium-server - presentation coaching API
//!
//! Startup order: environment, logging, configuration, root folder,
//! database, analyzer, then the HTTP listener.

use anyhow::{Context, Result};
use clap::Parser;
use podium_common::config::{RootFolderInitializer, TomlConfig};
use podium_common::db::{get_setting_or, init_database};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use podium_server::analysis::{
    FallbackAnalyzer, GeminiAnalyzer, GeminiClient, MediaAnalyzer, PollSettings,
};
use podium_server::api::health::BUILD;
use podium_server::config::{Cli, ServerConfig};
use podium_server::uploads::MediaStore;
use podium_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let dotenv = dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let toml_config = TomlConfig::load();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        commit = BUILD.commit,
        built_at = BUILD.built_at,
        profile = BUILD.profile,
        "Starting podium-server v{}",
        env!("CARGO_PKG_VERSION")
    );
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = ServerConfig::resolve(&cli, &toml_config);
    config.log_summary();

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let (analyzer, analysis_mode): (Arc<dyn MediaAnalyzer>, &'static str) =
        match &config.gemini_api_key {
            Some(api_key) => {
                let poll = PollSettings {
                    interval: Duration::from_millis(
                        get_setting_or(&pool, "analysis_poll_interval_ms", 5000u64).await?,
                    ),
                    timeout: Duration::from_millis(
                        get_setting_or(&pool, "analysis_poll_timeout_ms", 300_000u64).await?,
                    ),
                };
                let client = GeminiClient::new(api_key, &config.gemini_model)
                    .context("Failed to build Gemini client")?;
                (Arc::new(GeminiAnalyzer::new(client, poll)), "gemini")
            }
            None => (Arc::new(FallbackAnalyzer), "fallback"),
        };

    let media = MediaStore::new(initializer.uploads_path());
    let state = AppState::new(pool, &config.jwt_secret, media, analyzer, analysis_mode);
    let app = build_router(state);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
