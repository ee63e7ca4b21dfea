//! Profile avatar images

use chrono::{DateTime, Utc};
use podium_common::time::parse_rfc3339;
use serde::Serialize;
use sqlx::FromRow;

/// `avatars` row
#[derive(Debug, Clone, FromRow)]
pub struct Avatar {
    pub id: i64,
    /// Location on disk
    pub image_path: String,
    /// Public URL under `/uploads`
    pub image_url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarResponse {
    pub id: i64,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Avatar> for AvatarResponse {
    fn from(avatar: Avatar) -> Self {
        Self {
            id: avatar.id,
            image_url: avatar.image_url,
            created_at: parse_rfc3339(&avatar.created_at),
            updated_at: parse_rfc3339(&avatar.updated_at),
        }
    }
}
