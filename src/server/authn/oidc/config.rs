use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{expandenv, CommonConfig, PathSet};

/// Federated login through an external OpenID Connect provider
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OidcConfig {
    /// Provider issuer URL, e.g. `http://127.0.0.1:5556/dex`. Discovery
    /// document is fetched from `{issuer_url}/.well-known/openid-configuration`.
    #[serde(default = "OidcConfig::default_empty")]
    pub issuer_url: String,

    #[serde(default = "OidcConfig::default_empty")]
    pub client_id: String,

    #[serde(default = "OidcConfig::default_empty")]
    pub client_secret: String,

    /// Must match the redirect URI registered at the provider, normally
    /// `{public_url}/auth/callback`.
    #[serde(default = "OidcConfig::default_empty")]
    pub redirect_uri: String,

    #[serde(default = "OidcConfig::default_scopes")]
    pub scopes: Vec<String>,

    /// Name of the cookie binding the anti-forgery state to the browser.
    #[serde(default = "OidcConfig::default_state_cookie")]
    pub state_cookie: String,

    #[serde(default = "OidcConfig::default_state_ttl_secs")]
    pub state_ttl_secs: u64,
}

impl CommonConfig for OidcConfig {
    fn default() -> Self {
        Self {
            issuer_url: Self::default_empty(),
            client_id: Self::default_empty(),
            client_secret: Self::default_empty(),
            redirect_uri: Self::default_empty(),
            scopes: Self::default_scopes(),
            state_cookie: Self::default_state_cookie(),
            state_ttl_secs: Self::default_state_ttl_secs(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        self.issuer_url = expandenv("issuer_url", &self.issuer_url)?;
        self.client_id = expandenv("client_id", &self.client_id)?;
        self.client_secret = expandenv("client_secret", &self.client_secret)?;
        self.redirect_uri = expandenv("redirect_uri", &self.redirect_uri)?;

        if self.issuer_url.is_empty() {
            bail!("issuer_url is required in oidc mode");
        }
        Url::parse(&self.issuer_url).context("parse issuer_url")?;
        self.issuer_url = self.issuer_url.trim_end_matches('/').to_string();

        if self.client_id.is_empty() {
            bail!("client_id is required in oidc mode");
        }
        if self.client_secret.is_empty() {
            bail!("client_secret is required in oidc mode");
        }

        if self.redirect_uri.is_empty() {
            bail!("redirect_uri is required in oidc mode");
        }
        Url::parse(&self.redirect_uri).context("parse redirect_uri")?;

        if !self.scopes.iter().any(|scope| scope == "openid") {
            bail!("scopes must include 'openid'");
        }
        if self.state_cookie.is_empty() {
            bail!("state_cookie cannot be empty");
        }
        if self.state_ttl_secs == 0 {
            bail!("state_ttl_secs should not be 0");
        }

        Ok(())
    }
}

impl OidcConfig {
    pub fn default_empty() -> String {
        String::new()
    }

    pub fn default_scopes() -> Vec<String> {
        vec![
            String::from("openid"),
            String::from("profile"),
            String::from("email"),
        ]
    }

    pub fn default_state_cookie() -> String {
        String::from("oauth_state")
    }

    pub fn default_state_ttl_secs() -> u64 {
        10 * 60
    }
}
