use anyhow::Result;
use log::info;

use super::{Authorizer, AuthzRequest, AuthzResponse};

pub struct SuperadminAuthorizer;

impl SuperadminAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for SuperadminAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        if req.user.is_superadmin {
            info!(
                "Superadmin access granted: {} {} {}",
                req.user.email, req.verb, req.resource
            );
            return Ok(AuthzResponse::Ok);
        }

        Ok(AuthzResponse::Continue)
    }
}
