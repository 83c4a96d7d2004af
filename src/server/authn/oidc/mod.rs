pub mod client;
pub mod config;
pub mod login;
pub mod verifier;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OidcError {
    #[error("state mismatch")]
    StateMismatch,

    #[error("missing authorization code")]
    MissingCode,

    #[error("code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("invalid identity token: {0}")]
    TokenInvalid(String),

    #[error("claim '{0}' is missing from identity token")]
    ClaimMissing(&'static str),

    #[error("provider misconfigured: {0}")]
    Misconfigured(String),
}

/// Identity extracted from a verified provider identity token.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub email: String,
    pub subject: String,
    pub name: String,
    pub issued_at: u64,
    pub expiry: u64,
}

impl UserInfo {
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expiry
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp() as u64)
    }
}

/// Token endpoint response (RFC 6749 section 5.1, plus `id_token`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTokens {
    pub access_token: String,

    #[serde(default)]
    pub token_type: String,

    #[serde(default)]
    pub id_token: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization endpoint URL carrying `state`.
    fn authorize_url(&self, state: &str) -> Result<String, OidcError>;

    /// Trade an authorization code for the provider's token set. One round
    /// trip, never retried.
    async fn exchange(&self, code: &str) -> Result<ProviderTokens, OidcError>;

    fn verify_identity_token(&self, raw_token: &str) -> Result<UserInfo, OidcError>;
}
