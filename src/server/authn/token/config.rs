use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

/// Local session token configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenConfig {
    /// HMAC secret used to sign and verify tokens. Supports env expansion,
    /// e.g. `secret = "${JWT_SECRET}"`. Required in local mode.
    #[serde(default = "TokenConfig::default_secret")]
    pub secret: String,

    /// Token lifetime in hours.
    /// Default: 24. Must be greater than 0.
    #[serde(default = "TokenConfig::default_expiry_hours")]
    pub expiry_hours: u64,
}

impl CommonConfig for TokenConfig {
    fn default() -> Self {
        Self {
            secret: Self::default_secret(),
            expiry_hours: Self::default_expiry_hours(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        if self.expiry_hours == 0 {
            bail!("token expiry_hours should not be 0");
        }
        if self.expiry_hours > Self::MAX_EXPIRY_HOURS {
            bail!(
                "token expiry_hours must be less than or equal to {}",
                Self::MAX_EXPIRY_HOURS
            );
        }

        self.secret = expandenv("secret", &self.secret)?;
        if self.secret.is_empty() {
            bail!("token secret cannot be empty in local mode");
        }

        Ok(())
    }
}

impl TokenConfig {
    const MAX_EXPIRY_HOURS: u64 = 24 * 30;

    pub fn default_secret() -> String {
        String::new()
    }

    pub fn default_expiry_hours() -> u64 {
        24
    }
}
