//! Presentation analysis job
//!
//! Runs detached from the request that created the presentation. The
//! analyzer never fails, so the only failure mode is persisting its result;
//! that marks the presentation FAILED.

use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::analysis::{MediaAnalyzer, MediaRef, VideoAnalysis};
use crate::db;
use crate::db::feedback::NewFeedback;
use crate::models::PresentationStatus;
use crate::utils::retry_on_lock;
use crate::AppState;

const DEFAULT_MAX_LOCK_WAIT_MS: u64 = 5000;

impl From<&VideoAnalysis> for NewFeedback {
    fn from(analysis: &VideoAnalysis) -> Self {
        NewFeedback {
            expression: analysis.expression,
            intonation: analysis.intonation,
            posture: analysis.posture,
            video_score: analysis.video_score(),
            video_rating: analysis.overall_rating.to_string(),
            video_suggestion: analysis.suggestion.clone(),
            is_fallback: analysis.is_fallback,
        }
    }
}

/// Spawn the analysis job for a freshly created presentation
pub fn spawn_presentation_analysis(
    state: &AppState,
    presentation_id: i64,
    media: MediaRef,
) -> JoinHandle<()> {
    let db = state.db.clone();
    let analyzer = Arc::clone(&state.analyzer);

    tokio::spawn(async move {
        process_presentation(db, analyzer, presentation_id, media).await;
    })
}

/// Analyze the video and store feedback plus questions
pub async fn process_presentation(
    db: SqlitePool,
    analyzer: Arc<dyn MediaAnalyzer>,
    presentation_id: i64,
    media: MediaRef,
) {
    info!(presentation_id, path = %media.path.display(), "Starting presentation analysis");

    let analysis = analyzer.analyze_presentation(&media).await;
    if analysis.is_fallback {
        warn!(presentation_id, "Storing fallback analysis");
    }

    let feedback = NewFeedback::from(&analysis);
    let max_wait_ms = podium_common::db::get_setting_or(&db, "db_max_lock_wait_ms", DEFAULT_MAX_LOCK_WAIT_MS)
        .await
        .unwrap_or(DEFAULT_MAX_LOCK_WAIT_MS);

    let stored = retry_on_lock("store presentation analysis", max_wait_ms, || {
        db::feedback::store_analysis(&db, presentation_id, &feedback, &analysis.questions)
    })
    .await;

    match stored {
        Ok(()) => info!(
            presentation_id,
            video_score = feedback.video_score,
            questions = analysis.questions.len(),
            "Presentation analysis stored"
        ),
        Err(e) => {
            error!(presentation_id, error = %e, "Failed to store presentation analysis");
            match db::presentations::set_status(&db, presentation_id, PresentationStatus::Failed).await {
                Ok(true) => {}
                Ok(false) => warn!(presentation_id, "Presentation deleted before analysis finished"),
                Err(e) => error!(presentation_id, error = %e, "Failed to mark presentation FAILED"),
            }
        }
    }
}
