use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use log::{debug, info};
use serde::Deserialize;
use url::Url;

use super::config::OidcConfig;
use super::verifier::OidcVerifier;
use super::{IdentityProvider, OidcError, ProviderTokens, UserInfo};

/// Subset of the OpenID Provider Metadata this client relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
}

pub struct OidcClient {
    http: reqwest::Client,
    metadata: ProviderMetadata,
    verifier: OidcVerifier,

    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl OidcClient {
    const DISCOVERY_PATH: &'static str = "/.well-known/openid-configuration";

    /// Fetch the discovery document and the signing keys. Every later request
    /// made by this client, the code exchange included, is bounded by
    /// `timeout`.
    pub async fn discover(cfg: &OidcConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;

        let url = format!("{}{}", cfg.issuer_url, Self::DISCOVERY_PATH);
        debug!("Fetching OIDC discovery document from {url}");
        let metadata: ProviderMetadata = http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request discovery document '{url}'"))?
            .error_for_status()
            .context("discovery document response")?
            .json()
            .await
            .context("decode discovery document")?;

        if metadata.issuer.trim_end_matches('/') != cfg.issuer_url {
            bail!(
                "provider issuer '{}' does not match configured issuer '{}'",
                metadata.issuer,
                cfg.issuer_url
            );
        }

        let jwks: JwkSet = http
            .get(&metadata.jwks_uri)
            .send()
            .await
            .with_context(|| format!("request jwks '{}'", metadata.jwks_uri))?
            .error_for_status()
            .context("jwks response")?
            .json()
            .await
            .context("decode jwks")?;
        if jwks.keys.is_empty() {
            bail!("provider published no signing keys");
        }

        info!(
            "Discovered OIDC provider '{}' with {} signing key(s)",
            metadata.issuer,
            jwks.keys.len()
        );

        let verifier = OidcVerifier::new(metadata.issuer.clone(), cfg.client_id.clone(), jwks);
        Ok(Self {
            http,
            metadata,
            verifier,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            redirect_uri: cfg.redirect_uri.clone(),
            scopes: cfg.scopes.clone(),
        })
    }

    pub fn verifier(&self) -> OidcVerifier {
        self.verifier.clone()
    }
}

#[async_trait]
impl IdentityProvider for OidcClient {
    fn authorize_url(&self, state: &str) -> Result<String, OidcError> {
        let mut url = Url::parse(&self.metadata.authorization_endpoint)
            .map_err(|e| OidcError::Misconfigured(format!("parse authorization endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state);
        Ok(url.into())
    }

    async fn exchange(&self, code: &str) -> Result<ProviderTokens, OidcError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        let resp = self
            .http
            .post(&self.metadata.token_endpoint)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| OidcError::ExchangeFailed(format!("send token request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OidcError::ExchangeFailed(format!(
                "token endpoint returned {status}"
            )));
        }

        resp.json::<ProviderTokens>()
            .await
            .map_err(|e| OidcError::ExchangeFailed(format!("decode token response: {e}")))
    }

    fn verify_identity_token(&self, raw_token: &str) -> Result<UserInfo, OidcError> {
        self.verifier.verify_identity_token(raw_token)
    }
}
