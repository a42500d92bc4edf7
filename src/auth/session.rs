//! Session store adapter
//!
//! The session is a signed, client-held cookie: no server-side storage.
//! It carries at most one session token under a fixed cookie name,
//! sealed as `base64(token).base64(hmac_sha256(base64(token)))` with a
//! dedicated session secret. The signature protects integrity only; the
//! token stays visible to the browser.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

/// Cookie holding the sealed session token
pub const SESSION_COOKIE: &str = "session";

/// Cookie carrying the pending authorization state between /login and /auth
pub const STATE_COOKIE: &str = "oauth_state";

type HmacSha256 = Hmac<Sha256>;

fn sign(payload: &str, secret: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("session signer: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Seal a token into a signed cookie value
pub fn seal(token: &str, secret: &str) -> Result<String, AppError> {
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(token.as_bytes());
    let signature = sign(&payload, secret)?;
    Ok(format!("{}.{}", payload, signature))
}

/// Open a sealed cookie value, returning the token it carries.
///
/// Returns `None` for any malformed or tampered value; an unreadable
/// session is indistinguishable from an absent one.
pub fn open(sealed: &str, secret: &str) -> Option<String> {
    let (payload, signature_b64) = sealed.split_once('.')?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    let signature = general_purpose::URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    mac.verify_slice(&signature).ok()?;

    let token = general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
    String::from_utf8(token).ok()
}

/// Read the session token from the request's cookie jar
pub fn get(jar: &CookieJar, secret: &str) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| open(cookie.value(), secret))
}

/// Store a token in the session cookie
pub fn set(jar: CookieJar, token: &str, secret: &str, secure: bool) -> Result<CookieJar, AppError> {
    let sealed = seal(token, secret)?;
    Ok(jar.add(
        Cookie::build((SESSION_COOKIE, sealed))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build(),
    ))
}

/// Remove the session cookie; a no-op when it was never set
pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}

/// Store the pending authorization state
pub fn set_state(jar: CookieJar, state: &str, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((STATE_COOKIE, state.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build(),
    )
}

/// Read the pending authorization state, if any
pub fn get_state(jar: &CookieJar) -> Option<String> {
    jar.get(STATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Remove the pending authorization state cookie
pub fn clear_state(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(STATE_COOKIE).path("/").build())
}
