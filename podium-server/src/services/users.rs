//! Accounts and tokens

use podium_common::auth::{hash_password, issue_token, random_password, verify_password};
use podium_common::time::unix_millis;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info};

use crate::db;
use crate::db::users::{NewUser, UserChanges};
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest, User, UserResponse};
use crate::services::blocking;
use crate::validation::{validate_login, validate_register, validate_user_update};
use crate::AppState;

const EMAIL_TAKEN: &str = "Email has already existed!";
const INVALID_LOGIN: &str = "Invalid email or password!";
const USER_NOT_FOUND: &str = "User not found";
const GUEST_PASSWORD_LENGTH: usize = 32;
const GUEST_SUFFIX_LENGTH: usize = 6;
const GUEST_CREATE_ATTEMPTS: usize = 5;

async fn hash(password: String) -> ApiResult<String> {
    Ok(blocking(move || hash_password(&password)).await??)
}

async fn user_response(state: &AppState, user: User) -> ApiResult<UserResponse> {
    let avatar_url = match user.avatar_id {
        Some(avatar_id) => db::avatars::find_by_id(&state.db, avatar_id)
            .await?
            .map(|avatar| avatar.image_url),
        None => None,
    };
    Ok(UserResponse::new(user, avatar_url))
}

async fn token_response(state: &AppState, user: User) -> ApiResult<TokenResponse> {
    let token = issue_token(&user.token_subject(), &state.jwt_secret)?;
    Ok(TokenResponse {
        token,
        user: user_response(state, user).await?,
    })
}

pub async fn register(state: &AppState, req: &RegisterRequest) -> ApiResult<TokenResponse> {
    let creds = validate_register(req)?;

    if db::users::email_taken(&state.db, &creds.email, None).await? {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let new_user = NewUser {
        username: creds.username,
        email: creds.email,
        password_hash: hash(creds.password).await?,
        is_guest: false,
    };
    let user = db::users::create(&state.db, &new_user).await?;
    info!(user_id = user.id, "Registered user");

    token_response(state, user).await
}

/// Upgrade the calling guest account in place
pub async fn register_from_guest(
    state: &AppState,
    user_id: i64,
    req: &RegisterRequest,
) -> ApiResult<TokenResponse> {
    let creds = validate_register(req)?;

    let current = db::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;
    if !current.is_guest {
        return Err(ApiError::Forbidden(
            "Only guest users can use this endpoint".to_string(),
        ));
    }

    if db::users::email_taken(&state.db, &creds.email, Some(user_id)).await? {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let upgraded = NewUser {
        username: creds.username,
        email: creds.email,
        password_hash: hash(creds.password).await?,
        is_guest: false,
    };
    let user = db::users::upgrade_guest(&state.db, user_id, &upgraded).await?;
    info!(user_id, "Guest account registered");

    token_response(state, user).await
}

pub async fn login(state: &AppState, req: &LoginRequest) -> ApiResult<TokenResponse> {
    let (email, password) = validate_login(req)?;

    let user = db::users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::BadRequest(INVALID_LOGIN.to_string()))?;

    let stored_hash = user.password_hash.clone();
    let matches = blocking(move || verify_password(&password, &stored_hash)).await?;
    if !matches {
        return Err(ApiError::BadRequest(INVALID_LOGIN.to_string()));
    }

    info!(user_id = user.id, "User logged in");
    token_response(state, user).await
}

/// Name stem for a guest account; retries add a random suffix
fn guest_stem(attempt: usize) -> String {
    let stamp = unix_millis();
    if attempt == 0 {
        return format!("guest_{}", stamp);
    }
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GUEST_SUFFIX_LENGTH)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("guest_{}_{}", stamp, suffix)
}

/// Create a throwaway guest account
pub async fn guest(state: &AppState) -> ApiResult<TokenResponse> {
    let password_hash = hash(random_password(GUEST_PASSWORD_LENGTH)).await?;

    let mut attempt = 0;
    let user = loop {
        let stem = guest_stem(attempt);
        let new_user = NewUser {
            email: format!("{}@example.com", stem),
            username: stem,
            password_hash: password_hash.clone(),
            is_guest: true,
        };
        match db::users::create(&state.db, &new_user).await {
            Ok(user) => break user,
            Err(podium_common::Error::InvalidInput(_)) if attempt + 1 < GUEST_CREATE_ATTEMPTS => {
                debug!(attempt, email = %new_user.email, "Guest email taken, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };
    info!(user_id = user.id, "Created guest account");

    token_response(state, user).await
}

pub async fn get_current(state: &AppState, user_id: i64) -> ApiResult<UserResponse> {
    let user = db::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;
    user_response(state, user).await
}

pub async fn update_current(
    state: &AppState,
    user_id: i64,
    req: &UpdateUserRequest,
) -> ApiResult<UserResponse> {
    let changes = validate_user_update(req)?;

    if db::users::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    if let Some(email) = changes.email.as_deref() {
        if db::users::email_taken(&state.db, email, Some(user_id)).await? {
            return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
        }
    }

    if let Some(avatar_id) = changes.avatar_id {
        if db::avatars::find_by_id(&state.db, avatar_id).await?.is_none() {
            return Err(ApiError::NotFound("Avatar not found".to_string()));
        }
    }

    let password_hash = match changes.password {
        Some(password) => Some(hash(password).await?),
        None => None,
    };

    let user = db::users::update(
        &state.db,
        user_id,
        &UserChanges {
            username: changes.username,
            email: changes.email,
            password_hash,
            avatar_id: changes.avatar_id,
        },
    )
    .await?;

    user_response(state, user).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_stem_suffix_on_retry() {
        let first = guest_stem(0);
        assert!(first.starts_with("guest_"));
        assert_eq!(first.matches('_').count(), 1);

        let retry = guest_stem(1);
        let suffix = retry.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), GUEST_SUFFIX_LENGTH);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(retry, guest_stem(1));
    }
}
