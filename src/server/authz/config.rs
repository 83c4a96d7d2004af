use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

/// Authorization related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthzConfig {
    /// Identity allowed on every route without consulting the policy.
    /// Compared exactly with the authenticated email. Empty disables the
    /// override.
    #[serde(default = "AuthzConfig::default_superadmin_email")]
    pub superadmin_email: String,

    /// casbin model file. Empty uses the built-in model.
    #[serde(default = "AuthzConfig::default_model_path")]
    pub model_path: String,

    /// casbin policy CSV.
    /// Default: `{config_path}/rbac/policy.csv`.
    #[serde(default = "AuthzConfig::default_policy_path")]
    pub policy_path: String,
}

impl CommonConfig for AuthzConfig {
    fn default() -> Self {
        Self {
            superadmin_email: Self::default_superadmin_email(),
            model_path: Self::default_model_path(),
            policy_path: Self::default_policy_path(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.superadmin_email = expandenv("superadmin_email", &self.superadmin_email)?;

        if !self.model_path.is_empty() {
            self.model_path = expandenv("model_path", &self.model_path)?;
        }

        if self.policy_path.is_empty() {
            self.policy_path = ps
                .config_path
                .join("rbac")
                .join("policy.csv")
                .to_string_lossy()
                .to_string();
        } else {
            self.policy_path = expandenv("policy_path", &self.policy_path)?;
        }

        Ok(())
    }
}

impl AuthzConfig {
    pub fn default_superadmin_email() -> String {
        String::new()
    }

    pub fn default_model_path() -> String {
        String::new()
    }

    pub fn default_policy_path() -> String {
        String::new()
    }
}
