//! Login flow routes
//!
//! Five endpoints composing the codec, provider client and session
//! adapter into the browser-facing flow:
//! - GET /        - entry page, or redirect when already signed in
//! - GET /login   - redirect to the provider's authorization endpoint
//! - GET /auth    - provider callback: exchange code, mint token
//! - GET /welcome - protected page showing the subject
//! - GET /logout  - clear the session

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use chrono::Duration;
use rand::{distributions::Alphanumeric, Rng};

use super::provider::CallbackQuery;
use super::{session, token};
use crate::error::AppError;
use crate::pages;
use crate::AppState;

/// Create the login-flow router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/auth", get(auth_callback))
        .route("/welcome", get(welcome))
        .route("/logout", get(logout))
}

/// GET /
///
/// Sends visitors holding a session token straight to the protected
/// page; everyone else gets the entry page.
async fn index(State(state): State<AppState>, jar: CookieJar) -> Response {
    if session::get(&jar, &state.config.auth.session_secret).is_some() {
        Redirect::to("/welcome").into_response()
    } else {
        Html(pages::home_page()).into_response()
    }
}

/// GET /login
///
/// Starts the authorization-code flow: generates a state nonce, parks it
/// in its own cookie, and redirects to the provider.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let nonce = generate_state();
    let redirect_url = state
        .provider
        .authorization_redirect(&state.config.server.callback_url(), &nonce)
        .await?;

    let jar = session::set_state(jar, &nonce, state.config.should_use_secure_cookies());
    Ok((jar, Redirect::to(&redirect_url)))
}

/// GET /auth
///
/// Provider callback. A failed exchange propagates as a provider error
/// and renders the inline error page; the session is left untouched.
async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let expected_state = session::get_state(&jar);
    let identity = state
        .provider
        .complete_exchange(&query, expected_state.as_deref())
        .await?;

    let token = token::mint(
        &identity.email,
        Duration::minutes(state.config.auth.token_ttl_minutes),
        &state.config.auth.token_secret,
    )?;

    let jar = session::clear_state(jar);
    let jar = session::set(
        jar,
        &token,
        &state.config.auth.session_secret,
        state.config.should_use_secure_cookies(),
    )?;

    tracing::info!(subject = %identity.email, "login completed");
    Ok((jar, Redirect::to("/welcome")))
}

/// GET /welcome
///
/// Requires a verifiable session token. Absent, invalid and expired
/// tokens are all handled the same way: back to the entry page. A token
/// that no longer verifies is also removed from the session, otherwise
/// `/` would keep bouncing the browser back here on the cookie alone.
async fn welcome(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let Some(token) = session::get(&jar, &state.config.auth.session_secret) else {
        return Ok(Redirect::to("/").into_response());
    };

    match token::verify(&token, &state.config.auth.token_secret) {
        Ok(subject) => Ok(Html(pages::welcome_page(&subject)).into_response()),
        Err(AppError::InvalidToken | AppError::Expired) => {
            tracing::debug!("clearing session holding an unverifiable token");
            Ok((session::clear(jar), Redirect::to("/")).into_response())
        }
        Err(error) => Err(error),
    }
}

/// GET /logout
///
/// Clears the session and state cookies. The minted token itself stays
/// valid until its expiry; only the client-side copy is dropped.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = session::clear_state(session::clear(jar));
    (jar, Redirect::to("/"))
}

/// Generate a random state nonce for the authorization request
fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_nonce_is_long_and_random() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
