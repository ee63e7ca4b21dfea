//! Password hashing and bearer token issuance
//!
//! # Tokens
//!
//! - HS256 JWT signed with the configured secret
//! - Registered users: 24 hour lifetime
//! - Guest users: 7 day lifetime, refreshed once fewer than 24 hours remain
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies live here; the axum extractor that reads
//! the `Authorization` header is in podium-server.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lifetime of a registered user's token
pub const USER_TOKEN_HOURS: i64 = 24;

/// Lifetime of a guest token
pub const GUEST_TOKEN_DAYS: i64 = 7;

/// Guest tokens closer than this to expiry are reissued
pub const GUEST_REFRESH_WINDOW_HOURS: i64 = 24;

// ========================================
// Passwords
// ========================================

/// Hash a password with argon2id and a random salt (PHC string format)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC hash
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Random throwaway password for guest accounts
pub fn random_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

// ========================================
// Tokens
// ========================================

/// Identity carried inside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSubject {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_guest: bool,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    pub sub: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_guest: bool,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl TokenClaims {
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.sub,
            username: self.username.clone(),
            email: self.email.clone(),
            is_guest: self.is_guest,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Token lifetime for a subject
pub fn token_lifetime(subject: &TokenSubject) -> Duration {
    if subject.is_guest {
        Duration::days(GUEST_TOKEN_DAYS)
    } else {
        Duration::hours(USER_TOKEN_HOURS)
    }
}

/// Issue a signed token for a subject
pub fn issue_token(subject: &TokenSubject, secret: &str) -> Result<String> {
    issue_token_at(subject, secret, Utc::now())
}

/// Issue a token as if the current time were `now`
pub fn issue_token_at(subject: &TokenSubject, secret: &str, now: DateTime<Utc>) -> Result<String> {
    let claims = TokenClaims {
        sub: subject.id,
        username: subject.username.clone(),
        email: subject.email.clone(),
        is_guest: subject.is_guest,
        iat: now.timestamp(),
        exp: (now + token_lifetime(subject)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token signing failed: {}", e)))
}

/// Verify signature and expiry, returning the claims
pub fn verify_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| Error::Auth(e.to_string()))
}

/// True when a guest token should be reissued
pub fn needs_refresh(claims: &TokenClaims, now: DateTime<Utc>) -> bool {
    if !claims.is_guest {
        return false;
    }
    let remaining = claims.exp - now.timestamp();
    remaining < Duration::hours(GUEST_REFRESH_WINDOW_HOURS).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn subject(is_guest: bool) -> TokenSubject {
        TokenSubject {
            id: 7,
            username: "ayu".to_string(),
            email: "ayu@example.com".to_string(),
            is_guest,
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_roundtrip_keeps_subject() {
        let token = issue_token(&subject(false), SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.subject(), subject(false));
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_guest_token_lasts_a_week() {
        let token = issue_token(&subject(true), SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&subject(false), SECRET).unwrap();
        assert!(matches!(verify_token(&token, "other"), Err(Error::Auth(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::days(2);
        let token = issue_token_at(&subject(false), SECRET, issued).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_refresh_window_only_for_guests() {
        let now = Utc::now();
        let issued = now - Duration::days(6) - Duration::hours(1);
        let guest = verify_token(&issue_token_at(&subject(true), SECRET, issued).unwrap(), SECRET).unwrap();
        assert!(needs_refresh(&guest, now));

        let fresh_guest = verify_token(&issue_token(&subject(true), SECRET).unwrap(), SECRET).unwrap();
        assert!(!needs_refresh(&fresh_guest, now));

        let user_issued = now - Duration::hours(23);
        let user = verify_token(&issue_token_at(&subject(false), SECRET, user_issued).unwrap(), SECRET).unwrap();
        assert!(!needs_refresh(&user, now));
    }

    #[test]
    fn test_random_password_length() {
        let pw = random_password(24);
        assert_eq!(pw.len(), 24);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
