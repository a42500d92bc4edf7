//! Session-token codec
//!
//! Mints and verifies the short-lived JWT this service issues after a
//! successful provider exchange. HS256 with a symmetric secret; the
//! payload carries only the subject (the user's email) and an expiry.
//!
//! There is no refresh and no revocation list: logout removes the token
//! from the session cookie but a copied token stays valid until `exp`.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the authenticated user's email
    sub: String,
    /// Expiration, seconds since the Unix epoch
    exp: i64,
}

/// Mint a signed session token for `subject` expiring after `ttl`.
///
/// The application-wide default `ttl` lives in configuration
/// (`auth.token_ttl_minutes`); callers always pass it explicitly so
/// there is exactly one place the lifetime is decided.
pub fn mint(subject: &str, ttl: Duration, secret: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: subject.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.into()))
}

/// Verify a session token and return its subject.
///
/// # Errors
/// - `Expired` when the current time is at or past the token's `exp`
/// - `InvalidToken` when the signature does not verify, the payload
///   cannot be decoded, or the subject claim is missing
pub fn verify(token: &str, secret: &str) -> Result<String, AppError> {
    // The expiry check is done here rather than by the decoder: the
    // boundary is inclusive (a token dies the second it reaches `exp`),
    // which is stricter than the decoder's own comparison.
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Expired,
        _ => AppError::InvalidToken,
    })?;

    if data.claims.exp <= Utc::now().timestamp() {
        return Err(AppError::Expired);
    }

    Ok(data.claims.sub)
}
