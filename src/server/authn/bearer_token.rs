use actix_web::HttpRequest;
use anyhow::Result;
use log::{debug, warn};

use crate::server::context::AuthzContext;
use crate::server::response::AUTHN_FAILED;

use super::token::is_superadmin;
use super::{
    Authenticator, AuthnResponse, CredentialVerifier, INVALID_HEADER_FORMAT, MISSING_HEADER,
};

/// Reads `Authorization: Bearer <token>` and hands the token to a
/// [`CredentialVerifier`].
pub struct BearerTokenAuthenticator<V: CredentialVerifier> {
    verifier: V,
    superadmin_email: String,
}

impl<V: CredentialVerifier> BearerTokenAuthenticator<V> {
    pub fn new(verifier: V, superadmin_email: String) -> Self {
        Self {
            verifier,
            superadmin_email,
        }
    }
}

impl<V: CredentialVerifier> Authenticator for BearerTokenAuthenticator<V> {
    fn authenticate_request(&self, req: &HttpRequest) -> Result<AuthnResponse> {
        let auth = match req.headers().get("Authorization") {
            Some(auth) => match auth.to_str() {
                Ok(auth) => auth.trim(),
                Err(_) => return Ok(AuthnResponse::Unauthenticated(INVALID_HEADER_FORMAT)),
            },
            None => return Ok(AuthnResponse::Unauthenticated(MISSING_HEADER)),
        };
        if auth.is_empty() {
            return Ok(AuthnResponse::Unauthenticated(MISSING_HEADER));
        }

        let mut iter = auth.split_whitespace();
        let token = match (iter.next(), iter.next(), iter.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => return Ok(AuthnResponse::Unauthenticated(INVALID_HEADER_FORMAT)),
        };

        let identity = match self.verifier.verify_credential(token) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(
                    "Reject credential for {} {}: {e:#}",
                    req.method(),
                    req.path()
                );
                return Ok(AuthnResponse::Unauthenticated(AUTHN_FAILED));
            }
        };

        let is_superadmin = is_superadmin(&identity.email, &self.superadmin_email);
        debug!(
            "Authenticated '{}' (superadmin: {is_superadmin})",
            identity.email
        );
        Ok(AuthnResponse::Ok(AuthzContext {
            email: identity.email,
            subject: identity.subject,
            name: identity.name,
            is_superadmin,
        }))
    }
}
