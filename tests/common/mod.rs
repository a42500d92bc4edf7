//! Common test utilities for E2E tests

use std::sync::Arc;

use anteroom::auth::{CallbackQuery, ProviderClient, ProviderIdentity};
use anteroom::error::AppError;
use anteroom::{config, AppState};
use axum::async_trait;
use tokio::net::TcpListener;

/// Token-signing secret used by the test configuration
pub const TOKEN_SECRET: &str = "e2e-token-secret-32-bytes-long!!";

/// Session-cookie signing secret used by the test configuration
pub const SESSION_SECRET: &str = "e2e-session-secret-32-bytes-ok!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub client: reqwest::Client,
}

/// Stub identity provider
///
/// Returns a fixed authorization URL and either a canned identity or a
/// canned provider failure, so no network is involved.
pub struct StubProvider {
    outcome: Result<ProviderIdentity, String>,
}

impl StubProvider {
    pub fn succeeding(email: &str) -> Self {
        Self {
            outcome: Ok(ProviderIdentity {
                email: email.to_string(),
                name: Some("Test User".to_string()),
            }),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl ProviderClient for StubProvider {
    async fn authorization_redirect(
        &self,
        callback_url: &str,
        state: &str,
    ) -> Result<String, AppError> {
        Ok(format!(
            "https://provider.test/authorize?response_type=code&redirect_uri={callback_url}&state={state}"
        ))
    }

    async fn complete_exchange(
        &self,
        _query: &CallbackQuery,
        _expected_state: Option<&str>,
    ) -> Result<ProviderIdentity, AppError> {
        match &self.outcome {
            Ok(identity) => Ok(identity.clone()),
            Err(reason) => Err(AppError::provider(reason.clone())),
        }
    }
}

/// Build a valid test configuration
pub fn test_config() -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            public_url: "http://localhost:8000".to_string(),
        },
        provider: config::ProviderConfig {
            discovery_url: "https://provider.test/.well-known/openid-configuration".to_string(),
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            timeout_seconds: 5,
        },
        auth: config::AuthConfig {
            token_secret: TOKEN_SECRET.to_string(),
            session_secret: SESSION_SECRET.to_string(),
            token_ttl_minutes: 30,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a test server with the default succeeding stub provider
    pub async fn new() -> Self {
        Self::with_provider(Arc::new(StubProvider::succeeding("a@b.com"))).await
    }

    /// Create a test server with an injected provider client
    pub async fn with_provider(provider: Arc<dyn ProviderClient>) -> Self {
        let config = test_config();
        let state = AppState::new(config, provider);

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = anteroom::build_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        // Redirects are asserted on, never followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr: addr_str,
            client,
        }
    }

    /// Get full URL for a request path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}
