pub mod config;
pub mod factory;
pub mod jwt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::token::TokenResponse;

/// Claims carried by a locally issued session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    #[error("token expired")]
    Expired,

    #[error("sign token: {0}")]
    Sign(String),
}

pub trait TokenGenerator: Send + Sync {
    fn generate_token(&self, email: &str) -> Result<TokenResponse, TokenError>;
}

pub trait TokenValidator: Send + Sync {
    fn validate_token(&self, token: &str) -> Result<Claims, TokenError>;
}

/// Exact, case-sensitive comparison. An empty superadmin email matches nobody.
pub fn is_superadmin(email: &str, superadmin_email: &str) -> bool {
    !superadmin_email.is_empty() && email == superadmin_email
}
