//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)
//!
//! The bare `CLIENT_ID`, `CLIENT_SECRET` and `SECRET_KEY` environment
//! variables are honored on top of the prefixed form, since deployments
//! of the service have historically used them.

use serde::Deserialize;

/// Minimum length for either signing secret.
const MIN_SECRET_BYTES: usize = 32;

/// Main application configuration
///
/// Built once at startup and shared immutably via `AppState`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub host: String,
    /// Port number (e.g., 8000)
    pub port: u16,
    /// Public base URL the provider redirects back to
    /// (e.g., "http://localhost:8000")
    pub public_url: String,
}

impl ServerConfig {
    /// Full callback URL registered with the identity provider
    pub fn callback_url(&self) -> String {
        format!("{}/auth", self.public_url.trim_end_matches('/'))
    }
}

/// Identity provider configuration (OpenID Connect)
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// OpenID Connect discovery document URL
    pub discovery_url: String,
    /// OAuth client ID issued by the provider
    pub client_id: String,
    /// OAuth client secret issued by the provider
    pub client_secret: String,
    /// Timeout for provider HTTP calls, in seconds
    pub timeout_seconds: u64,
}

/// Token and session signing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session-token signing secret (32+ bytes)
    pub token_secret: String,
    /// Session-cookie signing secret (32+ bytes, distinct from token_secret)
    pub session_secret: String,
    /// Session-token lifetime in minutes (default: 30)
    pub token_ttl_minutes: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (ANTEROOM__*)
    /// 5. Bare CLIENT_ID / CLIENT_SECRET / SECRET_KEY variables
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.public_url", "http://localhost:8000")?
            .set_default(
                "provider.discovery_url",
                "https://accounts.google.com/.well-known/openid-configuration",
            )?
            .set_default("provider.timeout_seconds", 10)?
            .set_default("auth.token_ttl_minutes", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("ANTEROOM")
                    .separator("__")
                    .try_parsing(true),
            );

        // Unprefixed variables take precedence when set.
        for (var, key) in [
            ("CLIENT_ID", "provider.client_id"),
            ("CLIENT_SECRET", "provider.client_secret"),
            ("SECRET_KEY", "auth.token_secret"),
            ("SESSION_SECRET", "auth.session_secret"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Whether session cookies should carry the `Secure` attribute
    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.public_url.starts_with("https://")
    }

    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.auth.token_secret.as_bytes().len() < MIN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        if self.auth.session_secret.as_bytes().len() < MIN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        // The cookie signer and the token signer are separate trust domains.
        if self.auth.session_secret == self.auth.token_secret {
            return Err(crate::error::AppError::Config(
                "auth.session_secret must differ from auth.token_secret".to_string(),
            ));
        }

        if self.auth.token_ttl_minutes <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.token_ttl_minutes must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.server.public_url).is_err() {
            return Err(crate::error::AppError::Config(
                "server.public_url must be a valid URL".to_string(),
            ));
        }

        if url::Url::parse(&self.provider.discovery_url).is_err() {
            return Err(crate::error::AppError::Config(
                "provider.discovery_url must be a valid URL".to_string(),
            ));
        }

        Ok(())
    }
}
