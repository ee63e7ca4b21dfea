//! Learning endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use crate::api::{data, AuthUser};
use crate::error::ApiResult;
use crate::models::StartLearningRequest;
use crate::services::learning;
use crate::validation::validate_id;
use crate::AppState;

/// GET /api/learnings
pub async fn list_learnings(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(data(learning::list_learnings(&state).await?))
}

/// GET /api/learning-progress
pub async fn list_progress(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(data(learning::list_progress(&state, user.id).await?))
}

/// POST /api/learning-progress
pub async fn start_learning(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<StartLearningRequest>,
) -> ApiResult<impl IntoResponse> {
    let progress = learning::start(&state, user.id, &req).await?;
    Ok((StatusCode::CREATED, data(progress)))
}

/// GET /api/learning-progress/:id
pub async fn get_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "learning progress")?;
    Ok(data(learning::get_progress(&state, user.id, id).await?))
}

/// PATCH /api/learning-progress/:id/complete
pub async fn complete_learning(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "learning progress")?;
    Ok(data(learning::complete(&state, user.id, id).await?))
}

/// Public catalogue
pub fn learning_routes() -> Router<AppState> {
    Router::new().route("/api/learnings", get(list_learnings))
}

pub fn learning_progress_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/learning-progress",
            get(list_progress).post(start_learning),
        )
        .route("/api/learning-progress/:id", get(get_progress))
        .route("/api/learning-progress/:id/complete", patch(complete_learning))
}
