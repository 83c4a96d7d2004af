use anyhow::{bail, Result};

use super::oidc::verifier::OidcVerifier;
use super::oidc::UserInfo;
use super::token::jwt::JwtTokenValidator;
use super::token::TokenValidator;
use super::{CredentialVerifier, Identity};

/// Credential verifier for the configured auth mode.
pub enum UnionVerifier {
    Local(JwtTokenValidator),
    Oidc(OidcVerifier),
}

impl CredentialVerifier for UnionVerifier {
    fn verify_credential(&self, token: &str) -> Result<Identity> {
        match self {
            UnionVerifier::Local(validator) => {
                let claims = validator.validate_token(token)?;
                Ok(Identity {
                    subject: claims.sub,
                    name: claims.email.clone(),
                    email: claims.email,
                    issued_at: claims.iat,
                    expiry: claims.exp,
                })
            }
            UnionVerifier::Oidc(verifier) => {
                let user = verifier.verify_identity_token(token)?;
                if user.is_expired() {
                    bail!("identity token expired");
                }
                Ok(Identity::from(user))
            }
        }
    }
}

impl From<UserInfo> for Identity {
    fn from(user: UserInfo) -> Self {
        Self {
            email: user.email,
            subject: user.subject,
            name: user.name,
            issued_at: user.issued_at,
            expiry: user.expiry,
        }
    }
}
