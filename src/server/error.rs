use actix_web::http::StatusCode;
use thiserror::Error;

use super::authn::oidc::OidcError;
use super::authn::token::TokenError;
use super::response;

/// Errors surfaced to HTTP callers.
///
/// The `Display` output carries the operator-facing detail. Callers only ever
/// see [`ApiError::public_message`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden")]
    Forbidden,

    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("misconfiguration: {0}")]
    Misconfiguration(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            ApiError::Misconfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) | ApiError::Unauthenticated(msg) => msg.clone(),
            ApiError::Forbidden => String::from(response::FORBIDDEN),
            ApiError::UpstreamFailure(_) => String::from(response::UPSTREAM_ERROR),
            ApiError::Misconfiguration(_) => String::from(response::SERVER_ERROR),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidInput(msg) => ApiError::InvalidInput(String::from(msg)),
            TokenError::Sign(_) => ApiError::Misconfiguration(err.to_string()),
            TokenError::InvalidSignature | TokenError::InvalidFormat(_) | TokenError::Expired => {
                ApiError::Unauthenticated(String::from(response::AUTHN_FAILED))
            }
        }
    }
}

impl From<OidcError> for ApiError {
    fn from(err: OidcError) -> Self {
        match err {
            OidcError::StateMismatch => ApiError::InvalidInput(String::from("Invalid state parameter")),
            OidcError::MissingCode => {
                ApiError::InvalidInput(String::from("Authorization code is required"))
            }
            OidcError::ExchangeFailed(_)
            | OidcError::TokenInvalid(_)
            | OidcError::ClaimMissing(_) => ApiError::UpstreamFailure(err.to_string()),
            OidcError::Misconfigured(_) => ApiError::Misconfiguration(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::InvalidInput("bad".into()), 400, "bad"),
            (ApiError::Unauthenticated("who".into()), 401, "who"),
            (ApiError::Forbidden, 403, "Forbidden"),
            (
                ApiError::UpstreamFailure("connection refused".into()),
                502,
                "Identity provider request failed",
            ),
            (
                ApiError::Misconfiguration("bad policy file".into()),
                500,
                "Internal server error",
            ),
        ];
        for (err, status, message) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.public_message(), message);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err: ApiError = TokenError::InvalidFormat("InvalidBase64 at byte 3".into()).into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.public_message(), "Authentication failed");

        let err: ApiError = OidcError::ExchangeFailed("connect timeout to 10.0.0.1".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(!err.public_message().contains("10.0.0.1"));

        let err: ApiError = OidcError::StateMismatch.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
