//! Service layer
//!
//! Each operation is a short sequence of repository calls guarded by
//! existence and ownership checks. Handlers stay thin: extract, call a
//! service, wrap the DTO.

pub mod avatars;
pub mod feedback;
pub mod learning;
pub mod presentations;
pub mod questions;
pub mod scramble;
pub mod users;

use crate::error::{ApiError, ApiResult};

/// Run CPU-heavy password work off the async executor
pub(crate) async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))
}
