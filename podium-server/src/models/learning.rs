//! Learning catalogue and per-user progress

use chrono::{DateTime, Utc};
use podium_common::time::parse_rfc3339;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LearningProgressStatus {
    Onprogress,
    Completed,
}

impl LearningProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningProgressStatus::Onprogress => "ONPROGRESS",
            LearningProgressStatus::Completed => "COMPLETED",
        }
    }

    fn from_db(value: &str) -> Self {
        if value == "COMPLETED" {
            LearningProgressStatus::Completed
        } else {
            LearningProgressStatus::Onprogress
        }
    }
}

/// `learnings` row
#[derive(Debug, Clone, FromRow)]
pub struct Learning {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// `learning_progress` row
#[derive(Debug, Clone, FromRow)]
pub struct LearningProgress {
    pub id: i64,
    pub user_id: i64,
    pub learning_id: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// POST /api/learning-progress
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartLearningRequest {
    pub learning_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Learning> for LearningResponse {
    fn from(l: Learning) -> Self {
        Self {
            id: l.id,
            title: l.title,
            description: l.description,
            video_url: l.video_url,
            created_at: parse_rfc3339(&l.created_at),
            updated_at: parse_rfc3339(&l.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningProgressResponse {
    pub id: i64,
    pub user_id: i64,
    pub learning_id: i64,
    pub status: LearningProgressStatus,
    pub is_completed: bool,
    pub learning: Option<LearningResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningProgressResponse {
    pub fn new(progress: LearningProgress, learning: Option<Learning>) -> Self {
        let status = LearningProgressStatus::from_db(&progress.status);
        Self {
            id: progress.id,
            user_id: progress.user_id,
            learning_id: progress.learning_id,
            status,
            is_completed: status == LearningProgressStatus::Completed,
            learning: learning.map(LearningResponse::from),
            created_at: parse_rfc3339(&progress.created_at),
            updated_at: parse_rfc3339(&progress.updated_at),
        }
    }
}
