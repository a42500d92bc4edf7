//! Error types for Anteroom
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Provider exchange rejected or unreachable; recovered per request
    #[error("Provider error: {reason}")]
    Provider { reason: String },

    /// Session token failed signature or payload checks
    #[error("Invalid session token")]
    InvalidToken,

    /// Session token past its expiration
    #[error("Session token expired")]
    Expired,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Provider failures render an inline error page so the reason stays
    /// visible to the user. Invalid and expired tokens are treated exactly
    /// like an absent session: redirect to the entry page.
    fn into_response(self) -> Response {
        match self {
            AppError::Provider { reason } => {
                tracing::warn!(%reason, "provider exchange failed");
                Html(crate::pages::error_page(&reason)).into_response()
            }
            AppError::InvalidToken | AppError::Expired => {
                tracing::debug!(error = %self, "treating session as unauthenticated");
                Redirect::to("/").into_response()
            }
            AppError::Config(message) => {
                tracing::error!(%message, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error").into_response()
            }
            AppError::Internal(error) => {
                tracing::error!(%error, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl AppError {
    /// Shorthand for a provider-side failure
    pub fn provider(reason: impl Into<String>) -> Self {
        AppError::Provider {
            reason: reason.into(),
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
