//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Build stamp written by build.rs
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BuildInfo {
    pub commit: &'static str,
    pub built_at: &'static str,
    pub profile: &'static str,
}

pub const BUILD: BuildInfo = BuildInfo {
    commit: env!("PODIUM_COMMIT"),
    built_at: env!("PODIUM_BUILT_AT"),
    profile: env!("PODIUM_PROFILE"),
};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Module name ("podium-server")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether media analysis reaches the model or always falls back
    pub analysis: &'static str,
    pub build: BuildInfo,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "podium-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        analysis: state.analysis_mode,
        build: BUILD,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
