//! Identity provider client
//!
//! OAuth 2.0 authorization-code flow against one OpenID Connect provider.
//! Routes only see the `ProviderClient` trait, so an alternate provider or
//! a test double can be swapped in without touching handler code.

use axum::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::ProviderConfig;
use crate::error::AppError;

/// Scopes requested from the provider
const SCOPES: &str = "openid email profile";

/// Query parameters the provider sends to the callback
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code, present on success
    pub code: Option<String>,
    /// Echo of the state sent with the authorization request
    pub state: Option<String>,
    /// Error code, present when the provider denied the request
    pub error: Option<String>,
    /// Optional human-readable error detail
    pub error_description: Option<String>,
}

/// Identity claims extracted from the provider exchange
///
/// Transient: used only to derive the session token's subject.
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    pub email: String,
    pub name: Option<String>,
}

/// Capability interface for the delegated-authentication exchange
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Build the URL of the provider's authorization endpoint, including
    /// the callback the provider will redirect to after consent.
    async fn authorization_redirect(
        &self,
        callback_url: &str,
        state: &str,
    ) -> Result<String, AppError>;

    /// Complete the authorization-code exchange for the inbound callback.
    ///
    /// Every rejection (provider denial, state mismatch, missing code,
    /// network failure) surfaces as `AppError::Provider` so callers can
    /// render it; nothing here is fatal to the process.
    async fn complete_exchange(
        &self,
        query: &CallbackQuery,
        expected_state: Option<&str>,
    ) -> Result<ProviderIdentity, AppError>;
}

/// Discovery document fields this client uses
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: Option<String>,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    id_token: Option<String>,
}

/// Token endpoint error body (RFC 6749 §5.2)
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Claims read from the userinfo endpoint or the ID token payload
#[derive(Debug, Deserialize)]
struct IdentityClaims {
    email: Option<String>,
    name: Option<String>,
}

/// OpenID Connect provider client
///
/// Discovery metadata is fetched lazily from the configured well-known
/// URL and cached for the process lifetime.
pub struct OidcProvider {
    http: reqwest::Client,
    config: ProviderConfig,
    /// Callback URL registered with the provider, used as redirect_uri
    callback_url: String,
    metadata: OnceCell<ProviderMetadata>,
}

impl OidcProvider {
    pub fn new(http: reqwest::Client, config: ProviderConfig, callback_url: String) -> Self {
        Self {
            http,
            config,
            callback_url,
            metadata: OnceCell::new(),
        }
    }

    async fn metadata(&self) -> Result<&ProviderMetadata, AppError> {
        self.metadata
            .get_or_try_init(|| async {
                tracing::debug!(url = %self.config.discovery_url, "fetching provider metadata");
                let response = self
                    .http
                    .get(&self.config.discovery_url)
                    .send()
                    .await
                    .map_err(|e| AppError::provider(format!("discovery request failed: {e}")))?;

                if !response.status().is_success() {
                    return Err(AppError::provider(format!(
                        "discovery returned {}",
                        response.status()
                    )));
                }

                response
                    .json::<ProviderMetadata>()
                    .await
                    .map_err(|e| AppError::provider(format!("invalid discovery document: {e}")))
            })
            .await
    }

    async fn exchange_code(&self, code: &str, callback_url: &str) -> Result<TokenResponse, AppError> {
        let metadata = self.metadata().await?;

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", callback_url),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&metadata.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.json::<TokenErrorBody>().await.unwrap_or(TokenErrorBody {
                error: None,
                error_description: None,
            });
            let reason = match (body.error, body.error_description) {
                (Some(error), Some(detail)) => format!("{error}: {detail}"),
                (Some(error), None) => error,
                _ => format!("token endpoint returned {status}"),
            };
            return Err(AppError::provider(reason));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AppError::provider(format!("invalid token response: {e}")))
    }

    async fn fetch_identity(&self, tokens: &TokenResponse) -> Result<ProviderIdentity, AppError> {
        let metadata = self.metadata().await?;

        let claims = match (&metadata.userinfo_endpoint, &tokens.access_token) {
            (Some(userinfo_endpoint), Some(access_token)) => {
                let response = self
                    .http
                    .get(userinfo_endpoint)
                    .bearer_auth(access_token)
                    .send()
                    .await
                    .map_err(|e| AppError::provider(format!("userinfo request failed: {e}")))?;

                if !response.status().is_success() {
                    return Err(AppError::provider(format!(
                        "userinfo returned {}",
                        response.status()
                    )));
                }

                response
                    .json::<IdentityClaims>()
                    .await
                    .map_err(|e| AppError::provider(format!("invalid userinfo response: {e}")))?
            }
            _ => {
                let id_token = tokens
                    .id_token
                    .as_deref()
                    .ok_or_else(|| AppError::provider("no id_token in token response"))?;
                id_token_claims(id_token)?
            }
        };

        let email = claims
            .email
            .ok_or_else(|| AppError::provider("identity has no email claim"))?;

        Ok(ProviderIdentity {
            email,
            name: claims.name,
        })
    }
}

#[async_trait]
impl ProviderClient for OidcProvider {
    async fn authorization_redirect(
        &self,
        callback_url: &str,
        state: &str,
    ) -> Result<String, AppError> {
        let metadata = self.metadata().await?;
        build_authorize_url(
            &metadata.authorization_endpoint,
            &self.config.client_id,
            callback_url,
            state,
        )
    }

    async fn complete_exchange(
        &self,
        query: &CallbackQuery,
        expected_state: Option<&str>,
    ) -> Result<ProviderIdentity, AppError> {
        if let Some(error) = &query.error {
            let reason = match &query.error_description {
                Some(detail) => format!("{error}: {detail}"),
                None => error.clone(),
            };
            return Err(AppError::provider(reason));
        }

        match (query.state.as_deref(), expected_state) {
            (Some(got), Some(expected)) if got == expected => {}
            _ => return Err(AppError::provider("state mismatch")),
        }

        let code = query
            .code
            .as_deref()
            .ok_or_else(|| AppError::provider("missing authorization code"))?;

        let tokens = self.exchange_code(code, &self.callback_url).await?;
        self.fetch_identity(&tokens).await
    }
}

/// Construct the authorization-endpoint URL for the code flow
fn build_authorize_url(
    authorization_endpoint: &str,
    client_id: &str,
    callback_url: &str,
    state: &str,
) -> Result<String, AppError> {
    let mut url = url::Url::parse(authorization_endpoint)
        .map_err(|e| AppError::provider(format!("bad authorization endpoint: {e}")))?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", callback_url)
        .append_pair("scope", SCOPES)
        .append_pair("state", state);

    Ok(url.into())
}

/// Decode the claim payload of an ID token.
///
/// The token arrived over the TLS channel of our own token-endpoint
/// exchange, so its signature is not re-verified here.
fn id_token_claims(id_token: &str) -> Result<IdentityClaims, AppError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::provider("malformed id_token"))?;

    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AppError::provider("malformed id_token payload"))?;

    serde_json::from_slice(&bytes)
        .map_err(|_| AppError::provider("unreadable id_token claims"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OidcProvider {
        OidcProvider::new(
            reqwest::Client::new(),
            ProviderConfig {
                discovery_url: "https://provider.test/.well-known/openid-configuration"
                    .to_string(),
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                timeout_seconds: 10,
            },
            "http://localhost:8000/auth".to_string(),
        )
    }

    #[test]
    fn authorize_url_carries_code_flow_parameters() {
        let url = build_authorize_url(
            "https://provider.test/authorize",
            "client-id",
            "http://localhost:8000/auth",
            "nonce123",
        )
        .unwrap();

        assert!(url.starts_with("https://provider.test/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fauth"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("state=nonce123"));
    }

    #[test]
    fn id_token_claims_decodes_payload() {
        let payload = general_purpose::URL_SAFE_NO_PAD
            .encode(r#"{"email":"a@b.com","name":"Ada"}"#);
        let id_token = format!("header.{payload}.signature");

        let claims = id_token_claims(&id_token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
        assert_eq!(claims.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn exchange_surfaces_provider_denial() {
        let query = CallbackQuery {
            error: Some("access_denied".to_string()),
            ..Default::default()
        };

        let error = provider()
            .complete_exchange(&query, Some("nonce123"))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            AppError::Provider { reason } if reason.contains("access_denied")
        ));
    }

    #[tokio::test]
    async fn exchange_rejects_state_mismatch() {
        let query = CallbackQuery {
            code: Some("code".to_string()),
            state: Some("other".to_string()),
            ..Default::default()
        };

        let error = provider()
            .complete_exchange(&query, Some("nonce123"))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            AppError::Provider { reason } if reason.contains("state mismatch")
        ));
    }

    #[tokio::test]
    async fn exchange_rejects_missing_code() {
        let query = CallbackQuery {
            state: Some("nonce123".to_string()),
            ..Default::default()
        };

        let error = provider()
            .complete_exchange(&query, Some("nonce123"))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            AppError::Provider { reason } if reason.contains("missing authorization code")
        ));
    }
}
