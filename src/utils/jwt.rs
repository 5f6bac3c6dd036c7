use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::jwt::JwtConfig;
use crate::models::user::UserRole;

static JWT_CONFIG: OnceLock<JwtConfig> = OnceLock::new();

/// Initialize JWT config from environment. Must be called once at startup.
pub fn init_jwt_config(config: JwtConfig) -> Result<()> {
    JWT_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("JWT config already initialized"))?;
    Ok(())
}

fn get_config() -> Result<&'static JwtConfig> {
    JWT_CONFIG
        .get()
        .ok_or_else(|| anyhow::anyhow!("JWT config not initialized"))
}

/// Token lifetime in seconds, also used as the cookie `Max-Age`.
pub fn token_expiry() -> Result<u64> {
    Ok(get_config()?.token_expiry)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i32,
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

pub fn generate_token(user_id: i32, email: &str, role: UserRole) -> Result<String> {
    let config = get_config()?;
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        user_id,
        email: email.to_owned(),
        role,
        exp: now + config.token_expiry as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
}

/// Expired, malformed and tampered tokens all fail the same way.
pub fn verify_token(token: &str) -> Result<Claims> {
    let config = get_config()?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| anyhow::anyhow!("Failed to decode JWT: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn ensure_config() {
        INIT.call_once(|| {
            let _ = init_jwt_config(JwtConfig {
                secret: "a_very_long_secret_key_that_is_at_least_32_chars".to_string(),
                token_expiry: crate::config::jwt::DEFAULT_TOKEN_EXPIRY_SECS,
            });
        });
    }

    #[test]
    fn generate_verify_round_trip() {
        ensure_config();
        let token = generate_token(42, "editor@example.org", UserRole::Editor).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "editor@example.org");
        assert_eq!(claims.role, UserRole::Editor);
        assert_eq!(
            claims.exp - claims.iat,
            crate::config::jwt::DEFAULT_TOKEN_EXPIRY_SECS as usize
        );
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let claims = Claims {
            user_id: 7,
            email: "a@b.org".to_string(),
            role: UserRole::Admin,
            exp: 2,
            iat: 1,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["userId"], 7);
        assert_eq!(value["role"], "ADMIN");
    }

    #[test]
    fn tampered_token_fails() {
        ensure_config();
        let token = generate_token(42, "a@b.org", UserRole::Admin).unwrap();
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert!(verify_token(&tampered).is_err());
    }

    #[test]
    fn expired_token_fails() {
        ensure_config();
        let config = get_config().unwrap();
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            user_id: 42,
            email: "a@b.org".to_string(),
            role: UserRole::Admin,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn empty_token_fails() {
        ensure_config();
        assert!(verify_token("").is_err());
    }
}
