use std::sync::Arc;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::Utc;
use serde::Deserialize;

use crate::server::authn::oidc::login::LoginFlow;
use crate::server::authn::oidc::IdentityProvider;
use crate::server::error::ApiError;
use crate::server::response::Response;
use crate::types::token::{CallbackResponse, CallbackUser};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub code: String,
}

/// `GET /auth/login` and `GET /auth/callback` in oidc mode.
pub struct OidcHandler {
    flow: LoginFlow,

    state_cookie: String,
    state_ttl_secs: u64,
    secure_cookie: bool,
}

impl OidcHandler {
    const COOKIE_PATH: &'static str = "/auth";

    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        state_cookie: String,
        state_ttl_secs: u64,
        secure_cookie: bool,
    ) -> Self {
        Self {
            flow: LoginFlow::new(provider),
            state_cookie,
            state_ttl_secs,
            secure_cookie,
        }
    }

    pub fn login(&self) -> Response {
        let redirect = match self.flow.begin_login() {
            Ok(redirect) => redirect,
            Err(e) => return ApiError::from(e).into(),
        };

        let cookie = self
            .state_cookie(redirect.state)
            .max_age(CookieDuration::seconds(self.state_ttl_secs as i64))
            .finish();
        Response::redirect(&redirect.url, Some(cookie))
    }

    pub async fn callback(&self, req: &HttpRequest, query: CallbackQuery) -> Response {
        let stored_state = req
            .cookie(&self.state_cookie)
            .map(|c| c.value().to_string())
            .unwrap_or_default();

        let login = match self
            .flow
            .handle_callback(&query.state, &stored_state, &query.code)
            .await
        {
            Ok(login) => login,
            Err(e) => return ApiError::from(e).into(),
        };

        let now = Utc::now().timestamp() as u64;
        let resp = CallbackResponse {
            token: login.id_token,
            token_type: String::from("Bearer"),
            expires_in: login.user.expiry.saturating_sub(now),
            user: CallbackUser {
                email: login.user.email,
                name: login.user.name,
                subject: login.user.subject,
            },
        };

        // The state is single use.
        let removal = self.state_cookie(String::new()).finish();
        Response::json_with_removal(resp, removal)
    }

    fn state_cookie(&self, value: String) -> actix_web::cookie::CookieBuilder<'static> {
        Cookie::build(self.state_cookie.clone(), value)
            .path(Self::COOKIE_PATH)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
    }
}
