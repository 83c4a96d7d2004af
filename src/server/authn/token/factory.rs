use log::warn;

use super::config::TokenConfig;
use super::jwt::{JwtTokenGenerator, JwtTokenValidator};

pub struct TokenFactory {
    secret: Vec<u8>,
    expiry_hours: u64,
}

impl TokenFactory {
    const MIN_SECRET_LEN: usize = 32;

    pub fn new(cfg: &TokenConfig) -> Self {
        if cfg.secret.len() < Self::MIN_SECRET_LEN {
            warn!(
                "Token secret is shorter than {} bytes, use a longer random secret in production",
                Self::MIN_SECRET_LEN
            );
        }
        Self {
            secret: cfg.secret.clone().into_bytes(),
            expiry_hours: cfg.expiry_hours,
        }
    }

    pub fn build_token_generator(&self) -> JwtTokenGenerator {
        JwtTokenGenerator::new(&self.secret, self.expiry_hours)
    }

    pub fn build_token_validator(&self) -> JwtTokenValidator {
        JwtTokenValidator::new(&self.secret)
    }
}
