//! podium-server library
//!
//! HTTP API for presentation coaching: users upload a recorded
//! presentation, receive an AI assessment with follow-up questions, answer
//! them by voice and get a combined final grade.

pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod grading;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod uploads;
pub mod utils;
pub mod validation;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::analysis::MediaAnalyzer;
use crate::uploads::{MediaStore, UPLOADS_URL_PREFIX};

/// Upper bound on any request body; per-kind upload limits are enforced
/// while the multipart stream is read
pub const MAX_REQUEST_BODY_BYTES: usize = 128 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: Arc<str>,
    /// Uploaded media on disk
    pub media: MediaStore,
    pub analyzer: Arc<dyn MediaAnalyzer>,
    /// "gemini" or "fallback", reported by /health
    pub analysis_mode: &'static str,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        jwt_secret: &str,
        media: MediaStore,
        analyzer: Arc<dyn MediaAnalyzer>,
        analysis_mode: &'static str,
    ) -> Self {
        Self {
            db,
            jwt_secret: Arc::from(jwt_secret),
            media,
            analyzer,
            analysis_mode,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Health, account creation, login and the learning catalogue are public;
/// everything else requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let protected = Router::new()
        .merge(api::profile_routes())
        .merge(api::presentation_routes())
        .merge(api::question_routes())
        .merge(api::avatar_routes())
        .merge(api::learning_progress_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .merge(api::health_routes())
        .merge(api::account_routes())
        .merge(api::learning_routes());

    let uploads = ServeDir::new(state.media.root());

    Router::new()
        .merge(protected)
        .merge(public)
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
