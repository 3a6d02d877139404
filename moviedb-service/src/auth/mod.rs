use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;

/// Name of the cookie carrying the session token
pub const AUTH_COOKIE: &str = "jwt";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Invalid password hash: {0}")]
    MalformedHash(String),

    #[error("Failed to generate token: {0}")]
    TokenGeneration(String),

    #[error("Invalid or expired token")]
    InvalidToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

pub struct AuthService {
    jwt_config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(jwt_config.secret.as_bytes());

        Self {
            jwt_config,
            encoding_key,
            decoding_key,
        }
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify a password against a stored hash
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(password_hash).map_err(|e| AuthError::MalformedHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        is_admin: bool,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiry = now + Duration::days(self.jwt_config.token_expiry_days);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            is_admin,
            exp: expiry.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    pub fn secure_cookie(&self) -> bool {
        self.jwt_config.secure_cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_for_testing_only".to_string(),
            token_expiry_days: 30,
            secure_cookie: false,
        }
    }

    #[test]
    fn test_password_hashing() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let password = "SecurePassword123!";

        let hash = auth_service.hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(auth_service.verify_password(password, &hash).unwrap());
        assert!(!auth_service.verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let auth_service = AuthService::new(get_test_jwt_config());
        assert!(matches!(
            auth_service.verify_password("whatever", "not-a-phc-string"),
            Err(AuthError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_token_generation_and_validation() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let user_id = Uuid::new_v4();

        let token = auth_service.generate_token(user_id, "testuser", true).unwrap();

        let claims = auth_service.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.username, "testuser");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let auth_service = AuthService::new(get_test_jwt_config());
        let other = AuthService::new(JwtConfig {
            secret: "another_secret".to_string(),
            ..get_test_jwt_config()
        });

        let token = other.generate_token(Uuid::new_v4(), "mallory", true).unwrap();
        assert!(matches!(
            auth_service.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth_service = AuthService::new(JwtConfig {
            token_expiry_days: -1,
            ..get_test_jwt_config()
        });

        let token = auth_service.generate_token(Uuid::new_v4(), "late", false).unwrap();
        assert!(auth_service.validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let auth_service = AuthService::new(get_test_jwt_config());
        assert!(auth_service.validate_token("not.a.jwt").is_err());
    }
}
