use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use log::{info, warn};
use rand::rngs::OsRng;
use rand::RngCore;

use super::{IdentityProvider, OidcError, UserInfo};

const STATE_BYTES: usize = 32;

/// Where to send the browser, and the state that must come back with it.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub state: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CompletedLogin {
    pub user: UserInfo,

    /// The raw provider identity token, handed to the caller as its bearer
    /// credential.
    pub id_token: String,
}

/// Drives the authorization code flow against an [`IdentityProvider`].
///
/// A login moves from unauthenticated to awaiting the callback once
/// [`LoginFlow::begin_login`] hands out a state, and ends either
/// authenticated or failed in [`LoginFlow::handle_callback`]. The flow itself
/// keeps no state; the pending state travels in a client cookie.
pub struct LoginFlow {
    provider: Arc<dyn IdentityProvider>,
}

impl LoginFlow {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub fn begin_login(&self) -> Result<LoginRedirect, OidcError> {
        let state = generate_state();
        let url = self.provider.authorize_url(&state)?;
        Ok(LoginRedirect { state, url })
    }

    /// Complete a login. The state is checked before anything is sent to the
    /// provider, a mismatch never reaches the code exchange.
    pub async fn handle_callback(
        &self,
        received_state: &str,
        stored_state: &str,
        code: &str,
    ) -> Result<CompletedLogin, OidcError> {
        if stored_state.is_empty() || received_state != stored_state {
            warn!("OIDC callback state mismatch");
            return Err(OidcError::StateMismatch);
        }
        if code.is_empty() {
            return Err(OidcError::MissingCode);
        }

        let tokens = self.provider.exchange(code).await?;
        let id_token = match tokens.id_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(OidcError::TokenInvalid(String::from(
                    "no id_token in token response",
                )))
            }
        };

        let user = self.provider.verify_identity_token(&id_token)?;
        info!(
            "OIDC login succeeded: email={}, subject={}",
            user.email, user.subject
        );

        Ok(CompletedLogin { user, id_token })
    }
}

/// 256 bits from the OS RNG, base64url without padding.
pub fn generate_state() -> String {
    let mut buf = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
