//! Scoring records

use chrono::{DateTime, Utc};
use podium_common::time::parse_rfc3339;
use serde::Serialize;
use sqlx::FromRow;

/// `feedback` row
///
/// Created by the video analysis; the audio/overall columns stay NULL until
/// final feedback is generated.
#[derive(Debug, Clone, FromRow)]
pub struct Feedback {
    pub id: i64,
    pub presentation_id: i64,
    pub expression: f64,
    pub intonation: f64,
    pub posture: f64,
    pub video_score: f64,
    pub video_rating: String,
    pub video_suggestion: String,
    pub audio_score: Option<f64>,
    pub audio_suggestion: Option<String>,
    pub overall_score: Option<i64>,
    pub grade: Option<String>,
    pub is_fallback: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub presentation_id: i64,
    pub expression: f64,
    pub intonation: f64,
    pub posture: f64,
    pub video_score: f64,
    pub video_rating: String,
    pub video_suggestion: String,
    pub audio_score: Option<f64>,
    pub audio_suggestion: Option<String>,
    pub overall_score: Option<i64>,
    pub grade: Option<String>,
    pub is_fallback: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            presentation_id: f.presentation_id,
            expression: f.expression,
            intonation: f.intonation,
            posture: f.posture,
            video_score: f.video_score,
            video_rating: f.video_rating,
            video_suggestion: f.video_suggestion,
            audio_score: f.audio_score,
            audio_suggestion: f.audio_suggestion,
            overall_score: f.overall_score,
            grade: f.grade,
            is_fallback: f.is_fallback,
            created_at: parse_rfc3339(&f.created_at),
            updated_at: parse_rfc3339(&f.updated_at),
        }
    }
}

/// POST /api/presentations/:id/final-feedback
#[derive(Debug, Clone, Serialize)]
pub struct FinalFeedbackResponse {
    pub presentation_id: i64,
    pub expression: f64,
    pub intonation: f64,
    pub posture: f64,
    pub video_score: f64,
    pub video_rating: String,
    pub audio_score: f64,
    pub overall_score: i64,
    pub grade: String,
    pub video_suggestion: String,
    pub audio_suggestion: String,
    pub answered_questions: usize,
    /// Text of the first answered question
    pub question: Option<String>,
    /// Recording of the first answered question
    pub answer_audio_url: Option<String>,
}
