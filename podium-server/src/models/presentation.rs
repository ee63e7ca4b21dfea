//! Presentations, their generated questions and recorded answers

use chrono::{DateTime, Utc};
use podium_common::time::parse_rfc3339;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::models::FeedbackResponse;
use crate::uploads::public_url;

/// Presentation lifecycle
///
/// ONGOING → COMPLETED (analysis stored) or FAILED (analysis could not be
/// stored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresentationStatus {
    Ongoing,
    Completed,
    Failed,
}

impl PresentationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresentationStatus::Ongoing => "ONGOING",
            PresentationStatus::Completed => "COMPLETED",
            PresentationStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PresentationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresentationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONGOING" => Ok(PresentationStatus::Ongoing),
            "COMPLETED" => Ok(PresentationStatus::Completed),
            "FAILED" => Ok(PresentationStatus::Failed),
            other => Err(format!("Unknown presentation status: {}", other)),
        }
    }
}

/// `presentations` row
#[derive(Debug, Clone, FromRow)]
pub struct Presentation {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub video_path: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Presentation {
    /// Parsed status; the CHECK constraint keeps unknown values out
    pub fn status(&self) -> PresentationStatus {
        self.status.parse().unwrap_or(PresentationStatus::Failed)
    }
}

/// `questions` row, with whether an answer exists
#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: i64,
    pub presentation_id: i64,
    pub question: String,
    pub is_answered: bool,
    pub created_at: String,
}

/// `answers` row
#[derive(Debug, Clone, FromRow)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub audio_path: String,
    pub score: f64,
    pub suggestion: String,
    pub is_relevant: bool,
    pub created_at: String,
}

/// PATCH /api/presentations/:id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePresentationRequest {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentationResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub video_url: String,
    pub status: PresentationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Presentation> for PresentationResponse {
    fn from(p: Presentation) -> Self {
        Self {
            status: p.status(),
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            video_url: public_url(&p.video_path),
            created_at: parse_rfc3339(&p.created_at),
            updated_at: parse_rfc3339(&p.updated_at),
        }
    }
}

/// Question as listed in an analysis snapshot (text may be scrambled)
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub presentation_id: i64,
    pub question: String,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
}

impl QuestionResponse {
    /// Response carrying `text` in place of the stored question
    pub fn with_text(q: &Question, text: String) -> Self {
        Self {
            id: q.id,
            presentation_id: q.presentation_id,
            question: text,
            is_answered: q.is_answered,
            created_at: parse_rfc3339(&q.created_at),
        }
    }
}

/// GET /api/questions/:id
#[derive(Debug, Clone, Serialize)]
pub struct RevealedQuestionResponse {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub answer: Option<AnswerResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub id: i64,
    pub question_id: i64,
    pub audio_url: String,
    pub score: f64,
    pub suggestion: String,
    pub is_relevant: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Answer> for AnswerResponse {
    fn from(a: Answer) -> Self {
        Self {
            id: a.id,
            question_id: a.question_id,
            audio_url: public_url(&a.audio_path),
            score: a.score,
            suggestion: a.suggestion,
            is_relevant: a.is_relevant,
            created_at: parse_rfc3339(&a.created_at),
        }
    }
}

/// GET /api/presentations/:id/analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub presentation_id: i64,
    pub status: PresentationStatus,
    pub feedback: Option<FeedbackResponse>,
    pub questions: Vec<QuestionResponse>,
}

/// POST /api/presentations
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPresentationResponse {
    pub presentation: PresentationResponse,
    pub analysis: AnalysisResponse,
}
