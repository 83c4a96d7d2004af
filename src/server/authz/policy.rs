use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use casbin::{CoreApi, DefaultModel, Enforcer, FileAdapter, MemoryAdapter, MgmtApi};
use log::{debug, warn};

use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Built-in casbin model: `g` rows give role membership, `keyMatch` allows
/// `*` in path patterns, the action must match exactly.
pub const MODEL_CONF: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && keyMatch(r.obj, p.obj) && r.act == p.act
"#;

/// Evaluates `(email, path, method)` against a casbin policy loaded once at
/// startup.
pub struct PolicyAuthorizer {
    enforcer: Enforcer,
}

impl PolicyAuthorizer {
    /// Load the model from `model_path`, or the built-in model when it is
    /// `None`, and the policy table from a CSV file.
    pub async fn from_files(model_path: Option<&Path>, policy_path: &Path) -> Result<Self> {
        let model = match model_path {
            Some(path) => {
                let path = path
                    .to_str()
                    .ok_or_else(|| anyhow!("model path is not valid utf-8"))?;
                DefaultModel::from_file(path)
                    .await
                    .map_err(|e| anyhow!("load casbin model '{path}': {e}"))?
            }
            None => DefaultModel::from_str(MODEL_CONF)
                .await
                .map_err(|e| anyhow!("load built-in casbin model: {e}"))?,
        };

        if !policy_path.is_file() {
            bail!("policy file '{}' does not exist", policy_path.display());
        }
        let policy_path = policy_path
            .to_str()
            .ok_or_else(|| anyhow!("policy path is not valid utf-8"))?;
        let adapter = FileAdapter::new(String::from(policy_path));

        let enforcer = Enforcer::new(model, adapter)
            .await
            .map_err(|e| anyhow!("load casbin policy '{policy_path}': {e}"))?;
        Ok(Self { enforcer })
    }

    /// Build from in-memory rules with the built-in model. Each policy is
    /// `[subject, path pattern, method]`, each grouping `[member, role]`.
    pub async fn from_rules(policies: &[Vec<&str>], groupings: &[Vec<&str>]) -> Result<Self> {
        let model = DefaultModel::from_str(MODEL_CONF)
            .await
            .map_err(|e| anyhow!("load built-in casbin model: {e}"))?;
        let mut enforcer = Enforcer::new(model, MemoryAdapter::default())
            .await
            .map_err(|e| anyhow!("create casbin enforcer: {e}"))?;

        for policy in policies {
            let rule = policy.iter().map(|s| s.to_string()).collect();
            enforcer
                .add_policy(rule)
                .await
                .map_err(|e| anyhow!("add policy {policy:?}: {e}"))?;
        }
        for grouping in groupings {
            let rule = grouping.iter().map(|s| s.to_string()).collect();
            enforcer
                .add_grouping_policy(rule)
                .await
                .map_err(|e| anyhow!("add grouping {grouping:?}: {e}"))?;
        }
        enforcer
            .build_role_links()
            .map_err(|e| anyhow!("build role links: {e}"))?;

        Ok(Self { enforcer })
    }

    /// Whether `subject` appears anywhere in the policy or grouping rules.
    pub fn mentions(&self, subject: &str) -> bool {
        let policies = self.enforcer.get_policy();
        let groupings = self.enforcer.get_grouping_policy();
        policies
            .iter()
            .chain(groupings.iter())
            .any(|rule| rule.iter().any(|field| field == subject))
    }

    pub fn rule_count(&self) -> (usize, usize) {
        (
            self.enforcer.get_policy().len(),
            self.enforcer.get_grouping_policy().len(),
        )
    }
}

impl Authorizer for PolicyAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        let allowed = self
            .enforcer
            .enforce((
                req.user.email.as_str(),
                req.resource.as_str(),
                req.verb.as_str(),
            ))
            .map_err(|e| anyhow!("evaluate policy: {e}"))
            .with_context(|| format!("authorize {} {}", req.verb, req.resource))?;

        if allowed {
            debug!(
                "Policy allowed {} to {} {}",
                req.user.email, req.verb, req.resource
            );
            return Ok(AuthzResponse::Ok);
        }

        warn!(
            "Policy denied {} to {} {}",
            req.user.email, req.verb, req.resource
        );
        Ok(AuthzResponse::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::server::context::AuthzContext;

    use super::*;

    fn request(email: &str, verb: &str, resource: &str) -> AuthzRequest {
        AuthzRequest {
            resource: String::from(resource),
            verb: String::from(verb),
            user: AuthzContext {
                email: String::from(email),
                subject: String::from(email),
                name: String::new(),
                is_superadmin: false,
            },
        }
    }

    fn check(authz: &PolicyAuthorizer, email: &str, verb: &str, resource: &str) -> AuthzResponse {
        authz
            .authorize_request(&request(email, verb, resource))
            .unwrap()
    }

    async fn todo_policy() -> PolicyAuthorizer {
        PolicyAuthorizer::from_rules(
            &[
                vec!["admin", "/api/v1/todos", "GET"],
                vec!["admin", "/api/v1/todos", "POST"],
                vec!["user", "/api/v1/todos", "GET"],
            ],
            &[
                vec!["alice@example.com", "admin"],
                vec!["bob@example.com", "user"],
            ],
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_roles() {
        let authz = todo_policy().await;

        assert_eq!(check(&authz, "alice@example.com", "GET", "/api/v1/todos"), AuthzResponse::Ok);
        assert_eq!(check(&authz, "alice@example.com", "POST", "/api/v1/todos"), AuthzResponse::Ok);
        assert_eq!(check(&authz, "bob@example.com", "GET", "/api/v1/todos"), AuthzResponse::Ok);
        assert_eq!(
            check(&authz, "bob@example.com", "POST", "/api/v1/todos"),
            AuthzResponse::Unauthorized
        );
        assert_eq!(
            check(&authz, "alice@example.com", "DELETE", "/api/v1/todos"),
            AuthzResponse::Unauthorized
        );
        assert_eq!(
            check(&authz, "carol@example.com", "GET", "/api/v1/todos"),
            AuthzResponse::Unauthorized
        );
        // Method comparison is exact.
        assert_eq!(
            check(&authz, "bob@example.com", "get", "/api/v1/todos"),
            AuthzResponse::Unauthorized
        );

        assert!(authz.mentions("alice@example.com"));
        assert!(!authz.mentions("root@example.com"));
        assert_eq!(authz.rule_count(), (3, 2));
    }

    #[tokio::test]
    async fn test_wildcard() {
        let authz = PolicyAuthorizer::from_rules(
            &[vec!["reader", "/api/v1/*", "GET"]],
            &[vec!["carol@example.com", "reader"]],
        )
        .await
        .unwrap();

        assert_eq!(check(&authz, "carol@example.com", "GET", "/api/v1/todos"), AuthzResponse::Ok);
        assert_eq!(check(&authz, "carol@example.com", "GET", "/api/v1/todos/7"), AuthzResponse::Ok);
        assert_eq!(
            check(&authz, "carol@example.com", "POST", "/api/v1/todos"),
            AuthzResponse::Unauthorized
        );
        assert_eq!(
            check(&authz, "carol@example.com", "GET", "/api/v2/todos"),
            AuthzResponse::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_empty_policy() {
        let authz = PolicyAuthorizer::from_rules(&[], &[]).await.unwrap();
        assert_eq!(
            check(&authz, "alice@example.com", "GET", "/api/v1/todos"),
            AuthzResponse::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_from_files() {
        let dir = std::env::temp_dir().join(format!("todo-service-policy-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let model_path = dir.join("model.conf");
        let policy_path = dir.join("policy.csv");
        fs::write(&model_path, MODEL_CONF).unwrap();
        fs::write(
            &policy_path,
            "p, admin, /api/v1/todos, GET\n\
             p, admin, /api/v1/todos, POST\n\
             g, alice@example.com, admin\n",
        )
        .unwrap();

        let authz = PolicyAuthorizer::from_files(Some(&model_path), &policy_path)
            .await
            .unwrap();
        assert_eq!(check(&authz, "alice@example.com", "POST", "/api/v1/todos"), AuthzResponse::Ok);

        let authz = PolicyAuthorizer::from_files(None, &policy_path).await.unwrap();
        assert_eq!(check(&authz, "alice@example.com", "GET", "/api/v1/todos"), AuthzResponse::Ok);

        assert!(PolicyAuthorizer::from_files(None, &dir.join("missing.csv"))
            .await
            .is_err());
        assert!(PolicyAuthorizer::from_files(Some(&dir.join("missing.conf")), &policy_path)
            .await
            .is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
