//! Anteroom - a minimal OpenID Connect login relay
//!
//! Delegates authentication to one external identity provider via the
//! OAuth 2.0 authorization-code flow, then issues its own short-lived
//! signed session token, transported in a server-signed cookie.
//!
//! # Modules
//!
//! - `auth`: provider client, token codec, session adapter, routes
//! - `pages`: inline HTML views
//! - `config`: configuration management
//! - `error`: error types
//! - `models`: placeholder local-account record shapes

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pages;

use std::sync::Arc;

use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
///
/// Cloned per request; holds only the immutable configuration and the
/// provider client. There is no other shared mutable state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, loaded once at startup
    pub config: Arc<config::AppConfig>,

    /// Identity provider client (trait object so tests can stub it)
    pub provider: Arc<dyn auth::ProviderClient>,
}

impl AppState {
    pub fn new(config: config::AppConfig, provider: Arc<dyn auth::ProviderClient>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> axum::Router {
    auth::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
