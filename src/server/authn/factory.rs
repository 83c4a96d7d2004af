use anyhow::{bail, Context, Result};
use log::{info, warn};

use super::bearer_token::BearerTokenAuthenticator;
use super::bypass::BypassList;
use super::config::{AuthnConfig, AuthnMode};
use super::union::UnionVerifier;
use super::AuthnGate;

pub struct AuthnFactory;

impl AuthnFactory {
    pub fn new() -> Self {
        Self
    }

    /// Build the authentication gate. `verifier` must match the configured
    /// mode: local tokens or provider identity tokens, never both.
    pub fn build_authenticator(
        &self,
        cfg: &AuthnConfig,
        verifier: UnionVerifier,
        superadmin_email: &str,
    ) -> Result<AuthnGate> {
        match (&verifier, cfg.mode) {
            (UnionVerifier::Local(_), AuthnMode::Local)
            | (UnionVerifier::Oidc(_), AuthnMode::Oidc) => {}
            _ => bail!("credential verifier does not match auth mode {:?}", cfg.mode),
        }

        let bypass = BypassList::new(&cfg.public_paths).context("build bypass list")?;
        if !cfg.public_paths.is_empty() {
            info!("Extra public paths: {:?}", cfg.public_paths);
        }

        if superadmin_email.is_empty() {
            warn!("No superadmin configured, every request goes through the policy");
        } else {
            info!("Superadmin: {superadmin_email}");
        }

        let authenticator = BearerTokenAuthenticator::new(verifier, String::from(superadmin_email));
        Ok(AuthnGate::new(bypass, authenticator))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use crate::config::CommonConfig;
    use crate::server::authn::oidc::verifier::tests::test_verifier;
    use crate::server::authn::token::jwt::JwtTokenValidator;
    use crate::server::authn::{Authenticator, AuthnResponse};

    use super::*;

    #[test]
    fn test_factory() {
        let factory = AuthnFactory::new();

        let mut cfg = AuthnConfig::default();
        cfg.public_paths = vec![String::from("GET /docs/*")];
        let gate = factory
            .build_authenticator(&cfg, UnionVerifier::Local(JwtTokenValidator::new(b"s")), "")
            .unwrap();
        let req = TestRequest::get().uri("/docs/index.html").to_http_request();
        assert!(matches!(
            gate.authenticate_request(&req).unwrap(),
            AuthnResponse::Bypass
        ));

        // Mode and verifier must agree.
        assert!(factory
            .build_authenticator(&cfg, UnionVerifier::Oidc(test_verifier()), "")
            .is_err());
        cfg.mode = AuthnMode::Oidc;
        assert!(factory
            .build_authenticator(&cfg, UnionVerifier::Oidc(test_verifier()), "")
            .is_ok());

        cfg.public_paths = vec![String::from("/no-method")];
        assert!(factory
            .build_authenticator(&cfg, UnionVerifier::Oidc(test_verifier()), "")
            .is_err());
    }
}
