use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::{OidcError, UserInfo};

/// Algorithms a provider may sign identity tokens with. Symmetric algorithms
/// are never accepted.
const ASYMMETRIC_ALGORITHMS: [Algorithm; 9] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    iat: u64,

    exp: u64,
}

/// Verifies provider identity tokens against the keys published at
/// discovery time.
#[derive(Clone)]
pub struct OidcVerifier {
    issuer: String,
    client_id: String,
    jwks: JwkSet,
}

impl OidcVerifier {
    pub fn new(issuer: String, client_id: String, jwks: JwkSet) -> Self {
        Self {
            issuer,
            client_id,
            jwks,
        }
    }

    pub fn verify_identity_token(&self, raw_token: &str) -> Result<UserInfo, OidcError> {
        let header = decode_header(raw_token)
            .map_err(|e| OidcError::TokenInvalid(format!("decode header: {e}")))?;
        if !ASYMMETRIC_ALGORITHMS.contains(&header.alg) {
            return Err(OidcError::TokenInvalid(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let jwk = match header.kid {
            Some(ref kid) => self
                .jwks
                .find(kid)
                .ok_or_else(|| OidcError::TokenInvalid(format!("unknown key id '{kid}'")))?,
            None => match self.jwks.keys.as_slice() {
                [jwk] => jwk,
                _ => return Err(OidcError::TokenInvalid(String::from("missing key id"))),
            },
        };
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| OidcError::TokenInvalid(format!("load provider key: {e}")))?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "sub", "aud"]);
        validation.leeway = 0;

        let claims = decode::<IdTokenClaims>(raw_token, &key, &validation)
            .map_err(|e| OidcError::TokenInvalid(e.to_string()))?
            .claims;

        let email = match claims.email {
            Some(email) if !email.is_empty() => email,
            _ => return Err(OidcError::ClaimMissing("email")),
        };

        Ok(UserInfo {
            email,
            subject: claims.sub,
            name: claims.name.unwrap_or_default(),
            issued_at: claims.iat,
            expiry: claims.exp,
        })
    }
}
