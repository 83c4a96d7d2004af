use anyhow::Result;

use super::policy::PolicyAuthorizer;
use super::superadmin::SuperadminAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

pub enum UnionAuthorizer {
    Superadmin(SuperadminAuthorizer),
    Policy(PolicyAuthorizer),
}

impl Authorizer for UnionAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        match self {
            UnionAuthorizer::Superadmin(authz) => authz.authorize_request(req),
            UnionAuthorizer::Policy(authz) => authz.authorize_request(req),
        }
    }
}
