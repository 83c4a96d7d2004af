use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

use super::oidc::config::OidcConfig;
use super::token::config::TokenConfig;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthnMode {
    /// Tokens are issued by this service from `POST /auth`.
    Local,
    /// Identity tokens come from an external OpenID Connect provider.
    Oidc,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthnConfig {
    #[serde(default = "AuthnConfig::default_mode")]
    pub mode: AuthnMode,

    /// Extra routes reachable without a credential, as `"METHOD /path"`. A
    /// trailing `/*` matches every path below the prefix.
    #[serde(default = "AuthnConfig::default_public_paths")]
    pub public_paths: Vec<String>,

    #[serde(default = "TokenConfig::default")]
    pub token: TokenConfig,

    #[serde(default = "OidcConfig::default")]
    pub oidc: OidcConfig,
}

impl CommonConfig for AuthnConfig {
    fn default() -> Self {
        Self {
            mode: Self::default_mode(),
            public_paths: Self::default_public_paths(),
            token: TokenConfig::default(),
            oidc: OidcConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        // Only the active mode has to be fully configured.
        match self.mode {
            AuthnMode::Local => self.token.complete(ps)?,
            AuthnMode::Oidc => self.oidc.complete(ps)?,
        }
        Ok(())
    }
}

impl AuthnConfig {
    pub fn default_mode() -> AuthnMode {
        AuthnMode::Local
    }

    pub fn default_public_paths() -> Vec<String> {
        vec![]
    }
}
