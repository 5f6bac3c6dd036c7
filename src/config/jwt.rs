use anyhow::Result;
use std::env;

use super::parse_env_or;

/// Auth tokens and the `auth-token` cookie share this lifetime.
pub const DEFAULT_TOKEN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub token_expiry: u64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        if secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters"
            ));
        }

        let token_expiry = parse_env_or("JWT_EXPIRATION", DEFAULT_TOKEN_EXPIRY_SECS);

        Ok(Self {
            secret,
            token_expiry,
        })
    }
}
