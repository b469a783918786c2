//! Signed access tokens.
//!
//! A token is an HS256 JWT carrying the user's id, username and role. There
//! is no refresh flow: once a token expires the client logs in again.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use stencil_core::types::DbId;
use uuid::Uuid;

/// Payload of an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

const DEFAULT_EXPIRY_HOURS: i64 = 168;

/// Shortest `JWT_SECRET` taken from the environment as-is.
pub const MIN_SECRET_LENGTH: usize = 32;

const GENERATED_SECRET_LENGTH: usize = 64;

impl JwtConfig {
    /// Read `JWT_SECRET` and `JWT_EXPIRY_HOURS` (default `168`).
    ///
    /// Without a secret of at least [`MIN_SECRET_LENGTH`] characters a random
    /// one is generated for this process, so tokens do not survive a restart.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_EXPIRY_HOURS` is set but not a number.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| s.len() >= MIN_SECRET_LENGTH)
            .unwrap_or_else(|| {
                tracing::warn!(
                    min_length = MIN_SECRET_LENGTH,
                    "JWT_SECRET unset or too short, tokens will not outlive this process"
                );
                Alphanumeric.sample_string(&mut rand::rng(), GENERATED_SECRET_LENGTH)
            });

        let expiry_hours = match std::env::var("JWT_EXPIRY_HOURS") {
            Ok(raw) => raw.parse().expect("JWT_EXPIRY_HOURS must be a valid i64"),
            Err(_) => DEFAULT_EXPIRY_HOURS,
        };

        Self {
            secret,
            expiry_hours,
        }
    }

    /// Sign a token for a user, valid for `expiry_hours` from now.
    pub fn issue(
        &self,
        user_id: DbId,
        username: &str,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_owned(),
            role: role.to_owned(),
            exp: iat + self.expiry_hours * 3600,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, expiry_hours: i64) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiry_hours,
        }
    }

    #[test]
    fn issued_token_carries_identity_and_lifetime() {
        let cfg = config("a-secret-of-thirty-two-characters!!", 168);
        let token = cfg.issue(42, "ana", "admin").unwrap();

        let claims = cfg.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 168 * 3600);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let cfg = config("a-secret-of-thirty-two-characters!!", 1);
        // Past the default 60s leeway.
        let now = Utc::now().timestamp();
        let stale = Claims {
            sub: 1,
            username: "ana".into(),
            role: "admin".into(),
            exp: now - 300,
            iat: now - 4000,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap();

        assert!(cfg.verify(&token).is_err());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = config("secret-alpha", 1).issue(1, "ana", "admin").unwrap();
        assert!(config("secret-bravo", 1).verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(config("secret-alpha", 1).verify("not.a.jwt").is_err());
    }
}
