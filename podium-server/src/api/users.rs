//! Account endpoints
//!
//! Public: POST /api/register, /api/login, /api/guest
//! Private: POST /api/register-from-guest, GET/PATCH /api/users/me

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::api::{data, AuthUser};
use crate::error::ApiResult;
use crate::models::{LoginRequest, RegisterRequest, UpdateUserRequest};
use crate::services::users;
use crate::AppState;

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = users::register(&state, &req).await?;
    Ok((StatusCode::CREATED, data(response)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(data(users::login(&state, &req).await?))
}

/// POST /api/guest
pub async fn guest(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let response = users::guest(&state).await?;
    Ok((StatusCode::CREATED, data(response)))
}

/// POST /api/register-from-guest
pub async fn register_from_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(data(users::register_from_guest(&state, user.id, &req).await?))
}

/// GET /api/users/me
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> ApiResult<impl IntoResponse> {
    Ok(data(users::get_current(&state, user.id).await?))
}

/// PATCH /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(data(users::update_current(&state, user.id, &req).await?))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/guest", post(guest))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register-from-guest", post(register_from_guest))
        .route("/api/users/me", get(get_me).patch(update_me))
}
