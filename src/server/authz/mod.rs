mod policy;
mod superadmin;
mod union;

pub mod chain;
pub mod config;
pub mod factory;

use anyhow::Result;

pub use policy::PolicyAuthorizer;

use super::context::AuthzContext;

pub trait Authorizer: Send + Sync {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse>;
}

#[derive(Debug, Clone)]
pub struct AuthzRequest {
    /// Request path, e.g. `/api/v1/todos`.
    pub resource: String,
    /// HTTP method, e.g. `POST`.
    pub verb: String,
    pub user: AuthzContext,
}

/// Possible responses from an authorization check.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AuthzResponse {
    /// Access is granted
    Ok,
    /// Defers decision to next authorizer in chain
    Continue,
    /// Access is denied
    Unauthorized,
}
