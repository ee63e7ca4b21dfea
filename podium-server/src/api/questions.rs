//! Question endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::api::{data, AuthUser};
use crate::error::ApiResult;
use crate::services::questions;
use crate::validation::validate_id;
use crate::AppState;

/// GET /api/questions/:id
pub async fn reveal_question(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "question")?;
    Ok(data(questions::reveal(&state, user.id, id).await?))
}

/// POST /api/questions/:id/answer (multipart: `audio`)
pub async fn submit_answer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let id = validate_id(id, "question")?;
    let answer = questions::submit_answer(&state, user.id, id, multipart).await?;
    Ok((StatusCode::CREATED, data(answer)))
}

pub fn question_routes() -> Router<AppState> {
    Router::new()
        .route("/api/questions/:id", get(reveal_question))
        .route("/api/questions/:id/answer", post(submit_answer))
}
