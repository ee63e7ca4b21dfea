//! Learning catalogue and progress

use tracing::info;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{LearningProgressResponse, LearningResponse, StartLearningRequest};
use crate::validation::validate_id;
use crate::AppState;

const PROGRESS_NOT_FOUND: &str = "Learning progress not found";

pub async fn list_learnings(state: &AppState) -> ApiResult<Vec<LearningResponse>> {
    let learnings = db::learnings::list(&state.db).await?;
    Ok(learnings.into_iter().map(LearningResponse::from).collect())
}

pub async fn list_progress(state: &AppState, user_id: i64) -> ApiResult<Vec<LearningProgressResponse>> {
    let entries = db::learnings::list_progress(&state.db, user_id).await?;

    let mut responses = Vec::with_capacity(entries.len());
    for progress in entries {
        let learning = db::learnings::find_by_id(&state.db, progress.learning_id).await?;
        responses.push(LearningProgressResponse::new(progress, learning));
    }
    Ok(responses)
}

pub async fn get_progress(state: &AppState, user_id: i64, id: i64) -> ApiResult<LearningProgressResponse> {
    let progress = db::learnings::find_progress_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(PROGRESS_NOT_FOUND.to_string()))?;
    let learning = db::learnings::find_by_id(&state.db, progress.learning_id).await?;
    Ok(LearningProgressResponse::new(progress, learning))
}

pub async fn start(
    state: &AppState,
    user_id: i64,
    req: &StartLearningRequest,
) -> ApiResult<LearningProgressResponse> {
    let learning_id = match req.learning_id {
        Some(id) => validate_id(id, "learning")?,
        None => return Err(ApiError::BadRequest("Learning id is required".to_string())),
    };

    let learning = db::learnings::find_by_id(&state.db, learning_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Learning not found".to_string()))?;

    let progress = db::learnings::start(&state.db, user_id, learning_id).await?;
    info!(user_id, learning_id, "Learning started");

    Ok(LearningProgressResponse::new(progress, Some(learning)))
}

pub async fn complete(state: &AppState, user_id: i64, id: i64) -> ApiResult<LearningProgressResponse> {
    if db::learnings::find_progress_owned(&state.db, id, user_id).await?.is_none() {
        return Err(ApiError::NotFound(PROGRESS_NOT_FOUND.to_string()));
    }

    let progress = db::learnings::complete(&state.db, id, user_id).await?;
    let learning = db::learnings::find_by_id(&state.db, progress.learning_id).await?;
    info!(user_id, progress_id = id, "Learning completed");

    Ok(LearningProgressResponse::new(progress, learning))
}
