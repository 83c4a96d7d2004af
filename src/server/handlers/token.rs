use anyhow::{Context, Result};
use log::{error, info};
use regex::Regex;

use crate::server::authn::token::jwt::JwtTokenGenerator;
use crate::server::authn::token::TokenGenerator;
use crate::server::error::ApiError;
use crate::server::response::Response;
use crate::types::token::IssueTokenRequest;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$";

/// `POST /auth` in local mode. The caller names an email and gets a signed
/// session token for it.
pub struct TokenHandler {
    generator: JwtTokenGenerator,
    email_re: Regex,
}

impl TokenHandler {
    pub fn new(generator: JwtTokenGenerator) -> Result<Self> {
        let email_re = Regex::new(EMAIL_PATTERN).context("compile email pattern")?;
        Ok(Self {
            generator,
            email_re,
        })
    }

    pub fn issue_token(&self, body: &[u8]) -> Response {
        let req: IssueTokenRequest = match serde_json::from_slice(body) {
            Ok(req) => req,
            Err(_) => return Response::bad_request("Invalid request"),
        };

        // The email is the principal key, it is taken verbatim.
        let email = req.email.as_str();
        if email.is_empty() {
            return Response::bad_request("Email is required");
        }
        if !self.email_re.is_match(email) {
            return Response::bad_request("Invalid email format");
        }

        match self.generator.generate_token(email) {
            Ok(token) => {
                info!("Issued token for '{email}'");
                Response::json(token)
            }
            Err(e) => {
                error!("Failed to generate token for '{email}': {e}");
                ApiError::from(e).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::HttpResponse;

    use crate::types::response::CommonResponse;

    use super::*;

    #[test]
    fn test_issue_token() {
        let handler = TokenHandler::new(JwtTokenGenerator::new(b"handler-secret", 1)).unwrap();

        let resp = handler.issue_token(br#"{"email":"alice@example.com"}"#);
        assert_eq!(resp.status(), StatusCode::OK);

        let cases: [&[u8]; 8] = [
            b"",
            b"not json",
            br#"{"email":42}"#,
            br#"{}"#,
            br#"{"email":"   "}"#,
            br#"{"email":"alice"}"#,
            br#"{"email":"alice@example"}"#,
            br#"{"email":" alice@example.com"}"#,
        ];
        for body in cases {
            assert_eq!(
                handler.issue_token(body).status(),
                StatusCode::BAD_REQUEST,
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[actix_web::test]
    async fn test_issue_token_untrimmed() {
        let handler = TokenHandler::new(JwtTokenGenerator::new(b"handler-secret", 1)).unwrap();

        for body in [
            br#"{"email":" alice@example.com"}"#.as_slice(),
            br#"{"email":"alice@example.com "}"#.as_slice(),
            br#"{"email":"   "}"#.as_slice(),
        ] {
            let resp: HttpResponse = handler.issue_token(body).into();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = to_bytes(resp.into_body()).await.unwrap();
            let body: CommonResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(body.message.as_deref(), Some("Invalid email format"));
        }
    }

    #[test]
    fn test_email_pattern() {
        let re = Regex::new(EMAIL_PATTERN).unwrap();
        for email in ["a@b.co", "first.last+tag@sub.example.org", "x_y%z@host-1.io"] {
            assert!(re.is_match(email), "{email}");
        }
        for email in ["a@b", "@example.com", "a b@example.com", "a@example.c", "a@@example.com"] {
            assert!(!re.is_match(email), "{email}");
        }
    }
}
