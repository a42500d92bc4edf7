//! Delegated authentication
//!
//! Handles:
//! - The OpenID Connect authorization-code flow
//! - Session-token minting and verification
//! - The signed-cookie session adapter

mod handlers;
pub mod provider;
pub mod session;
pub mod token;

pub use handlers::router;
pub use provider::{CallbackQuery, OidcProvider, ProviderClient, ProviderIdentity};
