//! Presentation endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::api::{data, AuthUser};
use crate::error::ApiResult;
use crate::models::UpdatePresentationRequest;
use crate::services::{feedback, presentations};
use crate::uploads::{upload_limit, UploadKind};
use crate::validation::validate_id;
use crate::AppState;

/// POST /api/presentations (multipart: `title`, `video`)
pub async fn create_presentation(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let max_bytes = upload_limit(&state.db, UploadKind::Video).await;
    let form = state.media.read_form(multipart, UploadKind::Video, max_bytes).await?;

    let created = presentations::create(&state, user.id, form).await?;
    Ok((StatusCode::CREATED, data(created)))
}

/// GET /api/presentations
pub async fn list_presentations(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(data(presentations::list(&state, user.id).await?))
}

/// GET /api/presentations/:id/analysis
pub async fn get_analysis(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "presentation")?;
    Ok(data(presentations::get_analysis(&state, user.id, id).await?))
}

/// PATCH /api/presentations/:id
pub async fn update_presentation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePresentationRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "presentation")?;
    Ok(data(presentations::update_title(&state, user.id, id, &req).await?))
}

/// DELETE /api/presentations/:id
pub async fn delete_presentation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "presentation")?;
    presentations::delete(&state, user.id, id).await?;
    Ok(data(json!({ "id": id, "deleted": true })))
}

/// POST /api/presentations/:id/final-feedback
pub async fn generate_final_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "presentation")?;
    Ok(data(feedback::generate_final(&state, user.id, id).await?))
}

/// GET /api/presentations/:id/feedback
pub async fn get_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "presentation")?;
    Ok(data(feedback::get(&state, user.id, id).await?))
}

pub fn presentation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/presentations",
            post(create_presentation).get(list_presentations),
        )
        .route(
            "/api/presentations/:id",
            axum::routing::patch(update_presentation).delete(delete_presentation),
        )
        .route("/api/presentations/:id/analysis", get(get_analysis))
        .route("/api/presentations/:id/final-feedback", post(generate_final_feedback))
        .route("/api/presentations/:id/feedback", get(get_feedback))
}
