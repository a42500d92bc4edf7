//! Anteroom binary entry point

use std::sync::Arc;

use anteroom::{auth, config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Initialize tracing/logging
/// 2. Load configuration from file and environment
/// 3. Build the provider client and AppState
/// 4. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize tracing/logging
    let log_format =
        std::env::var("ANTEROOM__LOGGING__FORMAT").unwrap_or_else(|_| "pretty".to_string());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "anteroom=info,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "anteroom=info,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!("Starting Anteroom...");

    // 2. Load configuration
    let config = config::AppConfig::load()?;
    tracing::info!(
        public_url = %config.server.public_url,
        discovery_url = %config.provider.discovery_url,
        "Configuration loaded"
    );

    // 3. Build the provider client
    let http_client = reqwest::Client::builder()
        .user_agent("Anteroom/0.1.0")
        .timeout(std::time::Duration::from_secs(config.provider.timeout_seconds))
        .build()?;

    let provider = Arc::new(auth::OidcProvider::new(
        http_client,
        config.provider.clone(),
        config.server.callback_url(),
    ));

    let state = AppState::new(config.clone(), provider);

    // 4. Build Axum router and start the HTTP server
    let app = anteroom::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Callback URL: {}", config.server.callback_url());

    axum::serve(listener, app).await?;

    Ok(())
}
