//! Avatar images

use axum::extract::Multipart;
use tracing::info;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::AvatarResponse;
use crate::uploads::{upload_limit, UploadKind};
use crate::AppState;

const AVATAR_NOT_FOUND: &str = "Avatar not found";

fn not_found() -> ApiError {
    ApiError::NotFound(AVATAR_NOT_FOUND.to_string())
}

pub async fn create(state: &AppState, multipart: Multipart) -> ApiResult<AvatarResponse> {
    let max_bytes = upload_limit(&state.db, UploadKind::Image).await;
    let form = state.media.read_form(multipart, UploadKind::Image, max_bytes).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest(UploadKind::Image.missing_message()))?;

    match db::avatars::create(&state.db, &upload.path_string(), &upload.url()).await {
        Ok(avatar) => {
            info!(avatar_id = avatar.id, "Avatar created");
            Ok(avatar.into())
        }
        Err(e) => {
            state.media.remove(&upload.path).await;
            Err(e.into())
        }
    }
}

pub async fn list(state: &AppState) -> ApiResult<Vec<AvatarResponse>> {
    let avatars = db::avatars::list(&state.db).await?;
    Ok(avatars.into_iter().map(AvatarResponse::from).collect())
}

pub async fn get(state: &AppState, id: i64) -> ApiResult<AvatarResponse> {
    db::avatars::find_by_id(&state.db, id)
        .await?
        .map(AvatarResponse::from)
        .ok_or_else(not_found)
}

/// Replace the image of an avatar; without a file only `updated_at` moves
pub async fn update(state: &AppState, id: i64, multipart: Multipart) -> ApiResult<AvatarResponse> {
    let max_bytes = upload_limit(&state.db, UploadKind::Image).await;
    let form = state.media.read_form(multipart, UploadKind::Image, max_bytes).await?;

    let Some(existing) = db::avatars::find_by_id(&state.db, id).await? else {
        if let Some(upload) = form.file {
            state.media.remove(&upload.path).await;
        }
        return Err(not_found());
    };

    let Some(upload) = form.file else {
        return Ok(db::avatars::touch(&state.db, id).await?.into());
    };

    let updated = match db::avatars::update_image(&state.db, id, &upload.path_string(), &upload.url()).await {
        Ok(avatar) => avatar,
        Err(e) => {
            state.media.remove(&upload.path).await;
            return Err(e.into());
        }
    };

    state.media.remove_stored(&existing.image_path).await;
    info!(avatar_id = id, "Avatar image replaced");
    Ok(updated.into())
}

pub async fn delete(state: &AppState, id: i64) -> ApiResult<()> {
    let avatar = db::avatars::find_by_id(&state.db, id).await?.ok_or_else(not_found)?;

    db::avatars::delete(&state.db, id).await?;
    state.media.remove_stored(&avatar.image_path).await;

    info!(avatar_id = id, "Avatar deleted");
    Ok(())
}
