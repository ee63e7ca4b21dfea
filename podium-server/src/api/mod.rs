//! HTTP API handlers
//!
//! Successful responses are wrapped as `{ "data": ... }`; errors are
//! rendered by `ApiError` as `{ "errors": "..." }`.

pub mod auth;
pub mod avatars;
pub mod health;
pub mod learnings;
pub mod presentations;
pub mod questions;
pub mod users;

use axum::Json;
use serde::Serialize;

pub use auth::{auth_middleware, AuthUser};
pub use avatars::avatar_routes;
pub use health::health_routes;
pub use learnings::{learning_progress_routes, learning_routes};
pub use presentations::presentation_routes;
pub use questions::question_routes;
pub use users::{account_routes, profile_routes};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Wrap a value in the success envelope
pub fn data<T: Serialize>(value: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data: value })
}
