//! Bearer token authentication
//!
//! `auth_middleware` guards the private router: it verifies the token,
//! stores the caller as an `AuthUser` request extension and, for guest
//! tokens close to expiry, attaches a fresh token as `X-New-Token`.
//! Handlers receive the caller through the `AuthUser` extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use podium_common::auth::{issue_token, needs_refresh, verify_token, TokenClaims};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::AppState;

pub const NEW_TOKEN_HEADER: &str = "x-new-token";
const UNAUTHORIZED: &str = "Unauthorized user!";

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_guest: bool,
}

impl From<&TokenClaims> for AuthUser {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username.clone(),
            email: claims.email.clone(),
            is_guest: claims.is_guest,
        }
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized(UNAUTHORIZED.to_string())
}

/// Token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(unauthorized)?;

    let claims = verify_token(token, &state.jwt_secret).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        unauthorized()
    })?;

    let refreshed = if needs_refresh(&claims, Utc::now()) {
        match issue_token(&claims.subject(), &state.jwt_secret) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(user_id = claims.sub, error = %e, "Guest token refresh failed");
                None
            }
        }
    } else {
        None
    };

    request.extensions_mut().insert(AuthUser::from(&claims));
    let mut response = next.run(request).await;

    if let Some(token) = refreshed {
        if let Ok(value) = HeaderValue::from_str(&token) {
            debug!(user_id = claims.sub, "Guest token refreshed");
            response.headers_mut().insert(NEW_TOKEN_HEADER, value);
        }
    }

    Ok(response)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(unauthorized)
    }
}
