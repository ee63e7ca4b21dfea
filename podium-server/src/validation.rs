//! Request validation
//!
//! Checks run field by field in declaration order and stop at the first
//! failure, which becomes a 400 with that field's message.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, RegisterRequest, UpdateUserRequest};

pub const MIN_PASSWORD_LENGTH: usize = 8;

const USERNAME_EMPTY: &str = "Username can not be empty!";
const EMAIL_EMPTY: &str = "Email can not be empty!";
const EMAIL_INVALID: &str = "Email format is invalid!";
const PASSWORD_TOO_SHORT: &str = "Password must contain more than or equal to 8 characters!";
const AVATAR_ID_INVALID: &str = "Avatar ID must be greater than or equal to 1!";
const TITLE_EMPTY: &str = "Title can not be empty!";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn bad_request(message: &str) -> ApiError {
    ApiError::BadRequest(message.to_string())
}

/// Validated account credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

fn username(value: Option<&str>) -> ApiResult<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| bad_request(USERNAME_EMPTY))
}

fn email(value: Option<&str>) -> ApiResult<String> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| bad_request(EMAIL_EMPTY))?;

    let valid = email_regex().map(|re| re.is_match(value)).unwrap_or(false);
    if !valid {
        return Err(bad_request(EMAIL_INVALID));
    }
    Ok(value.to_ascii_lowercase())
}

fn password(value: Option<&str>) -> ApiResult<String> {
    match value {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LENGTH => Ok(p.to_string()),
        _ => Err(bad_request(PASSWORD_TOO_SHORT)),
    }
}

pub fn validate_register(req: &RegisterRequest) -> ApiResult<Credentials> {
    Ok(Credentials {
        username: username(req.username.as_deref())?,
        email: email(req.email.as_deref())?,
        password: password(req.password.as_deref())?,
    })
}

/// Returns (email, password)
pub fn validate_login(req: &LoginRequest) -> ApiResult<(String, String)> {
    Ok((email(req.email.as_deref())?, password(req.password.as_deref())?))
}

/// Validated profile changes; absent fields stay `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar_id: Option<i64>,
}

pub fn validate_user_update(req: &UpdateUserRequest) -> ApiResult<ProfileChanges> {
    let username = match req.username.as_deref() {
        Some(v) => Some(username(Some(v))?),
        None => None,
    };
    let email = match req.email.as_deref() {
        Some(v) => Some(email(Some(v))?),
        None => None,
    };
    let password = match req.password.as_deref() {
        Some(v) => Some(password(Some(v))?),
        None => None,
    };
    if let Some(id) = req.avatar_id {
        if id < 1 {
            return Err(bad_request(AVATAR_ID_INVALID));
        }
    }

    Ok(ProfileChanges {
        username,
        email,
        password,
        avatar_id: req.avatar_id,
    })
}

pub fn validate_title(title: Option<&str>) -> ApiResult<String> {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| bad_request(TITLE_EMPTY))
}

/// Path ids must be positive
pub fn validate_id(id: i64, what: &str) -> ApiResult<i64> {
    if id < 1 {
        return Err(ApiError::BadRequest(format!("Invalid {} id", what)));
    }
    Ok(id)
}
