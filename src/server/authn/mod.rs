mod bearer_token;
mod bypass;
mod union;

pub mod config;
pub mod factory;
pub mod oidc;
pub mod token;

use actix_web::HttpRequest;
use anyhow::Result;

pub use bearer_token::BearerTokenAuthenticator;
pub use bypass::BypassList;
pub use union::UnionVerifier;

use super::context::AuthzContext;

pub const MISSING_HEADER: &str = "Authorization header is missing";
pub const INVALID_HEADER_FORMAT: &str = "Authorization header format must be 'Bearer {token}'";

/// Identity established from a verified bearer credential. Built fresh for
/// every request and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub email: String,
    pub subject: String,
    pub name: String,
    pub issued_at: u64,
    pub expiry: u64,
}

/// Turns a raw bearer credential into an [`Identity`].
pub trait CredentialVerifier: Send + Sync {
    fn verify_credential(&self, token: &str) -> Result<Identity>;
}

pub trait Authenticator: Send + Sync {
    fn authenticate_request(&self, req: &HttpRequest) -> Result<AuthnResponse>;
}

#[derive(Debug, Clone)]
pub enum AuthnResponse {
    /// Credential verified, the context goes into the request extensions.
    Ok(AuthzContext),
    /// Route is on the bypass list, no checks were made.
    Bypass,
    /// The message is safe to return to the caller.
    Unauthenticated(&'static str),
}

/// Authentication stage run once per request before routing.
pub struct AuthnGate {
    bypass: BypassList,
    authenticator: BearerTokenAuthenticator<UnionVerifier>,
}

impl AuthnGate {
    pub fn new(bypass: BypassList, authenticator: BearerTokenAuthenticator<UnionVerifier>) -> Self {
        Self {
            bypass,
            authenticator,
        }
    }
}

impl Authenticator for AuthnGate {
    fn authenticate_request(&self, req: &HttpRequest) -> Result<AuthnResponse> {
        if self.bypass.contains(req.method(), req.path()) {
            return Ok(AuthnResponse::Bypass);
        }
        self.authenticator.authenticate_request(req)
    }
}
