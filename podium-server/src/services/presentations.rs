//! Presentations

use tracing::info;

use crate::analysis::MediaRef;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AnalysisResponse, CreatedPresentationResponse, FeedbackResponse, Presentation,
    PresentationResponse, QuestionResponse, UpdatePresentationRequest,
};
use crate::pipeline::spawn_presentation_analysis;
use crate::services::scramble::scramble;
use crate::uploads::{UploadForm, UploadKind};
use crate::validation::validate_title;
use crate::AppState;

pub const PRESENTATION_NOT_FOUND: &str = "Presentation not found or access denied";

/// Presentation `id` owned by `user_id`, else 404
pub async fn find_owned(state: &AppState, user_id: i64, id: i64) -> ApiResult<Presentation> {
    db::presentations::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(PRESENTATION_NOT_FOUND.to_string()))
}

/// Current feedback and (scrambled) questions of a presentation
async fn analysis_snapshot(state: &AppState, presentation: &Presentation) -> ApiResult<AnalysisResponse> {
    let feedback = db::feedback::find_by_presentation(&state.db, presentation.id)
        .await?
        .map(FeedbackResponse::from);
    let questions = db::questions::list_for_presentation(&state.db, presentation.id)
        .await?
        .iter()
        .map(|q| QuestionResponse::with_text(q, scramble(&q.question)))
        .collect();

    Ok(AnalysisResponse {
        presentation_id: presentation.id,
        status: presentation.status(),
        feedback,
        questions,
    })
}

/// Store the uploaded video and start its analysis
///
/// The response is sent while the analysis is still running, so its
/// snapshot normally shows `ONGOING` with no feedback.
pub async fn create(
    state: &AppState,
    user_id: i64,
    form: UploadForm,
) -> ApiResult<CreatedPresentationResponse> {
    let title = validate_title(form.text("title"));
    let Some(upload) = form.file else {
        return Err(ApiError::BadRequest(UploadKind::Video.missing_message()));
    };
    let title = match title {
        Ok(title) => title,
        Err(e) => {
            state.media.remove(&upload.path).await;
            return Err(e);
        }
    };

    let presentation =
        match db::presentations::create(&state.db, user_id, &title, &upload.path_string()).await {
            Ok(p) => p,
            Err(e) => {
                state.media.remove(&upload.path).await;
                return Err(e.into());
            }
        };
    info!(presentation_id = presentation.id, user_id, "Presentation created");

    spawn_presentation_analysis(
        state,
        presentation.id,
        MediaRef::new(upload.path.clone(), upload.mime_type.clone()),
    );

    let analysis = analysis_snapshot(state, &presentation).await?;
    Ok(CreatedPresentationResponse {
        presentation: presentation.into(),
        analysis,
    })
}

pub async fn list(state: &AppState, user_id: i64) -> ApiResult<Vec<PresentationResponse>> {
    let presentations = db::presentations::list_for_user(&state.db, user_id).await?;
    Ok(presentations.into_iter().map(PresentationResponse::from).collect())
}

pub async fn get_analysis(state: &AppState, user_id: i64, id: i64) -> ApiResult<AnalysisResponse> {
    let presentation = find_owned(state, user_id, id).await?;
    analysis_snapshot(state, &presentation).await
}

pub async fn update_title(
    state: &AppState,
    user_id: i64,
    id: i64,
    req: &UpdatePresentationRequest,
) -> ApiResult<PresentationResponse> {
    let title = validate_title(req.title.as_deref())?;
    find_owned(state, user_id, id).await?;

    db::presentations::update_title(&state.db, id, &title).await?;
    let updated = find_owned(state, user_id, id).await?;
    Ok(updated.into())
}

/// Delete a presentation together with its video and answer recordings
pub async fn delete(state: &AppState, user_id: i64, id: i64) -> ApiResult<()> {
    let presentation = find_owned(state, user_id, id).await?;
    let answers = db::answers::list_for_presentation(&state.db, id).await?;

    db::presentations::delete(&state.db, id).await?;

    state.media.remove_stored(&presentation.video_path).await;
    for answered in &answers {
        state.media.remove_stored(&answered.answer.audio_path).await;
    }

    info!(
        presentation_id = id,
        removed_recordings = answers.len(),
        "Presentation deleted"
    );
    Ok(())
}
