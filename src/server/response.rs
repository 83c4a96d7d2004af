use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use log::{error, warn};
use serde::Serialize;

use crate::types::response::CommonResponse;

use super::error::ApiError;

pub const AUTHN_FAILED: &str = "Authentication failed";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const FORBIDDEN: &str = "Forbidden";
pub const UPSTREAM_ERROR: &str = "Identity provider request failed";
pub const SERVER_ERROR: &str = "Internal server error";

/// A wrapper struct for HTTP responses that provides convenient methods
/// for creating common response types
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    pub fn not_found(message: impl AsRef<str>) -> Self {
        Self::err_response(StatusCode::NOT_FOUND, message.as_ref())
    }

    pub fn bad_request(message: impl AsRef<str>) -> Self {
        Self::err_response(StatusCode::BAD_REQUEST, message.as_ref())
    }

    pub fn unauthenticated(message: impl AsRef<str>) -> Self {
        Self::err_response(StatusCode::UNAUTHORIZED, message.as_ref())
    }

    pub fn forbidden() -> Self {
        Self::err_response(StatusCode::FORBIDDEN, FORBIDDEN)
    }

    pub fn error(message: impl AsRef<str>) -> Self {
        Self::err_response(StatusCode::INTERNAL_SERVER_ERROR, message.as_ref())
    }

    pub fn service_unavailable(message: impl AsRef<str>) -> Self {
        Self::err_response(StatusCode::SERVICE_UNAVAILABLE, message.as_ref())
    }

    pub fn json<T: Serialize>(data: T) -> Self {
        Self {
            http_response: HttpResponse::Ok().json(data),
        }
    }

    pub fn created<T: Serialize>(data: T) -> Self {
        Self {
            http_response: HttpResponse::Created().json(data),
        }
    }

    pub fn text(body: &'static str) -> Self {
        Self {
            http_response: HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body(body),
        }
    }

    /// 302 to `location`, optionally setting a cookie on the way.
    pub fn redirect(location: &str, cookie: Option<Cookie<'static>>) -> Self {
        let mut resp = HttpResponse::Found();
        resp.insert_header((header::LOCATION, location));
        if let Some(cookie) = cookie {
            resp.cookie(cookie);
        }
        Self {
            http_response: resp.finish(),
        }
    }

    /// Like [`Response::json`], removing the given cookie from the client.
    pub fn json_with_removal<T: Serialize>(data: T, cookie: Cookie<'static>) -> Self {
        let mut resp = HttpResponse::Ok();
        let mut http_response = resp.json(data);
        if let Err(e) = http_response.add_removal_cookie(&cookie) {
            warn!("Failed to clear cookie '{}': {e}", cookie.name());
        }
        Self { http_response }
    }

    pub fn status(&self) -> StatusCode {
        self.http_response.status()
    }

    fn err_response(status: StatusCode, message: &str) -> Self {
        let resp = CommonResponse {
            code: status.into(),
            message: Some(String::from(message)),
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::UpstreamFailure(_) | ApiError::Misconfiguration(_) => error!("{err}"),
            _ => {}
        }
        Self::err_response(err.status(), &err.public_message())
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}
