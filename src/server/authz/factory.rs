use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};

use super::chain::ChainAuthorizer;
use super::config::AuthzConfig;
use super::policy::PolicyAuthorizer;
use super::superadmin::SuperadminAuthorizer;
use super::union::UnionAuthorizer;

pub struct AuthzFactory;

impl AuthzFactory {
    pub fn new() -> Self {
        Self
    }

    /// Superadmin override first, then the casbin policy.
    pub async fn build_authorizer(&self, cfg: &AuthzConfig) -> Result<ChainAuthorizer> {
        let model_path = if cfg.model_path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&cfg.model_path))
        };
        let policy_path = PathBuf::from(&cfg.policy_path);

        let policy = PolicyAuthorizer::from_files(model_path.as_deref(), &policy_path).await?;
        let (policies, groupings) = policy.rule_count();
        info!(
            "Loaded {policies} policy rule(s) and {groupings} role assignment(s) from '{}'",
            cfg.policy_path
        );

        Ok(self.build_chain(cfg, policy))
    }

    pub fn build_chain(&self, cfg: &AuthzConfig, policy: PolicyAuthorizer) -> ChainAuthorizer {
        if !cfg.superadmin_email.is_empty() && policy.mentions(&cfg.superadmin_email) {
            warn!(
                "Superadmin '{}' appears in the policy table, its rules are never consulted",
                cfg.superadmin_email
            );
        }

        ChainAuthorizer::new(vec![
            UnionAuthorizer::Superadmin(SuperadminAuthorizer::new()),
            UnionAuthorizer::Policy(policy),
        ])
    }
}
