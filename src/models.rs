//! Local-account record shapes
//!
//! Reserved for a future local-account feature; no endpoint reads or
//! writes these today. Kept so the wire shapes are agreed on before the
//! feature lands.

use serde::{Deserialize, Serialize};

/// Registration payload for a local account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOut {
    pub email: String,
    pub name: String,
}

/// Stored form of a local account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInDb {
    pub email: String,
    pub name: String,
    pub hashed_password: Option<String>,
}
