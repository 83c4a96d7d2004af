use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::types::token::TokenResponse;

use super::{Claims, TokenError, TokenGenerator, TokenValidator};

/// Only the HMAC family is accepted. A token whose header names any other
/// algorithm is rejected before its signature is looked at.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

pub struct JwtTokenGenerator {
    key: EncodingKey, // Shared secret for signing
    expiry_secs: u64,
}

impl JwtTokenGenerator {
    pub fn new(secret: &[u8], expiry_hours: u64) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            expiry_secs: expiry_hours * 60 * 60,
        }
    }

    pub fn generate_token_at(&self, email: &str, now: u64) -> Result<TokenResponse, TokenError> {
        if email.is_empty() {
            return Err(TokenError::InvalidInput("email cannot be empty"));
        }

        let claims = Claims {
            email: String::from(email),
            sub: String::from(email),
            iat: now,
            exp: now + self.expiry_secs,
        };

        match encode(&Header::new(Algorithm::HS256), &claims, &self.key) {
            Ok(token) => Ok(TokenResponse { token }),
            Err(e) => Err(TokenError::Sign(e.to_string())),
        }
    }
}

impl TokenGenerator for JwtTokenGenerator {
    fn generate_token(&self, email: &str) -> Result<TokenResponse, TokenError> {
        self.generate_token_at(email, Utc::now().timestamp() as u64)
    }
}

pub struct JwtTokenValidator {
    key: DecodingKey,
}

impl JwtTokenValidator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
        }
    }

    pub fn validate_token_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::InvalidFormat(String::from("empty token")));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;
        // Expiry is checked below against `now`.
        validation.validate_exp = false;

        let claims = match decode::<Claims>(token, &self.key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                return Err(match e.kind() {
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidAlgorithmName
                    | ErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::InvalidFormat(e.to_string()),
                })
            }
        };

        if claims.email.is_empty() {
            return Err(TokenError::InvalidFormat(String::from("empty email claim")));
        }

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl TokenValidator for JwtTokenValidator {
    fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_token_at(token, Utc::now().timestamp() as u64)
    }
}
