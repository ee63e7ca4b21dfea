//! User accounts

use chrono::{DateTime, Utc};
use podium_common::time::parse_rfc3339;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `users` row
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_guest: bool,
    pub avatar_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn token_subject(&self) -> podium_common::auth::TokenSubject {
        podium_common::auth::TokenSubject {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            is_guest: self.is_guest,
        }
    }
}

/// POST /api/register and POST /api/register-from-guest
///
/// Fields are optional so that missing values surface as validation
/// messages instead of JSON rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/login
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// PATCH /api/users/me
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar_id: Option<i64>,
}

/// Issued bearer token plus the account it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_guest: bool,
    pub avatar_id: Option<i64>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: User, avatar_url: Option<String>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_guest: user.is_guest,
            avatar_id: user.avatar_id,
            avatar_url,
            created_at: parse_rfc3339(&user.created_at),
            updated_at: parse_rfc3339(&user.updated_at),
        }
    }
}
