//! Avatar endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;

use crate::api::data;
use crate::error::ApiResult;
use crate::services::avatars;
use crate::validation::validate_id;
use crate::AppState;

/// POST /api/avatars (multipart: `image`)
pub async fn create_avatar(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let avatar = avatars::create(&state, multipart).await?;
    Ok((StatusCode::CREATED, data(avatar)))
}

/// GET /api/avatars
pub async fn list_avatars(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(data(avatars::list(&state).await?))
}

/// GET /api/avatars/:id
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "avatar")?;
    Ok(data(avatars::get(&state, id).await?))
}

/// PUT /api/avatars/:id (multipart, `image` optional)
pub async fn update_avatar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "avatar")?;
    Ok(data(avatars::update(&state, id, multipart).await?))
}

/// DELETE /api/avatars/:id
pub async fn delete_avatar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "avatar")?;
    avatars::delete(&state, id).await?;
    Ok(data(json!({ "id": id, "deleted": true })))
}

pub fn avatar_routes() -> Router<AppState> {
    Router::new()
        .route("/api/avatars", get(list_avatars).post(create_avatar))
        .route(
            "/api/avatars/:id",
            get(get_avatar).put(update_avatar).delete(delete_avatar),
        )
}
