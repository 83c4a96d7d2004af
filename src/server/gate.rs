use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpResponse};
use log::{error, warn};

use super::authn::{Authenticator, AuthnResponse};
use super::authz::{Authorizer, AuthzRequest, AuthzResponse};
use super::context::AuthzContext;
use super::response::{self, Response};
use super::restful::RestfulContext;

/// Authenticates every request before routing. Bypassed routes pass through
/// untouched, everything else needs a valid bearer credential and gets an
/// [`AuthzContext`] in its extensions.
pub async fn authn_gate(
    ctx: Data<RestfulContext>,
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let resp = match ctx.authn.authenticate_request(req.request()) {
        Ok(resp) => resp,
        Err(e) => {
            error!("Authenticate {} {}: {e:#}", req.method(), req.path());
            return Ok(reject(req, Response::error(response::SERVER_ERROR)));
        }
    };

    match resp {
        AuthnResponse::Bypass => {}
        AuthnResponse::Ok(user) => {
            req.extensions_mut().insert(user);
        }
        AuthnResponse::Unauthenticated(message) => {
            return Ok(reject(req, Response::unauthenticated(message)));
        }
    }

    Ok(next.call(req).await?.map_into_boxed_body())
}

/// Evaluates the policy for requests that already passed [`authn_gate`].
pub async fn authz_gate(
    ctx: Data<RestfulContext>,
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let user = req.extensions().get::<AuthzContext>().cloned();
    let user = match user {
        Some(user) => user,
        None => {
            error!(
                "No authorization context on {} {}, is the authentication gate installed?",
                req.method(),
                req.path()
            );
            return Ok(reject(req, Response::unauthenticated(response::UNAUTHORIZED)));
        }
    };

    let authz_req = AuthzRequest {
        resource: req.path().to_string(),
        verb: req.method().as_str().to_string(),
        user,
    };
    match ctx.authz.authorize_request(&authz_req) {
        Ok(AuthzResponse::Ok) => {}
        Ok(AuthzResponse::Continue) | Ok(AuthzResponse::Unauthorized) => {
            warn!(
                "Forbidden: {} {} {}",
                authz_req.user.email, authz_req.verb, authz_req.resource
            );
            return Ok(reject(req, Response::forbidden()));
        }
        Err(e) => {
            error!("Policy evaluation failed: {e:#}");
            return Ok(reject(req, Response::error(response::SERVER_ERROR)));
        }
    }

    Ok(next.call(req).await?.map_into_boxed_body())
}

fn reject(req: ServiceRequest, resp: Response) -> ServiceResponse<BoxBody> {
    req.into_response(HttpResponse::from(resp))
}
