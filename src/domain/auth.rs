use crate::error::{AppError, Result};
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// JWT payload carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: u64,
}

impl Claims {
    #[must_use]
    pub fn new(user_id: Uuid, email: impl Into<String>, ttl_secs: u64) -> Self {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
        Self { sub: user_id, email: email.into(), exp: now + ttl_secs }
    }

    /// Signs the claims with HS256.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub fn encode(&self, secret: &str) -> Result<String> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret.as_bytes())).map_err(|e| {
            tracing::error!(error = %e, "failed to sign access token");
            AppError::Internal
        })
    }

    /// Verifies signature and expiry.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for any invalid or expired token.
    pub fn decode(token: &str, secret: &str) -> Result<Self> {
        decode::<Self>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::AuthError)
    }
}

/// Opaque refresh tokens. Only the SHA-256 digest ever reaches the database.
#[derive(Debug)]
pub struct OpaqueToken;

impl OpaqueToken {
    /// 32 random bytes, base64url without padding.
    #[must_use]
    pub fn generate() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    #[must_use]
    pub fn hash(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip() {
        let claims = Claims::new(Uuid::new_v4(), "pilot@example.com", 3600);
        let token = claims.encode("test_secret").unwrap();
        assert_eq!(Claims::decode(&token, "test_secret").unwrap(), claims);
    }

    #[test]
    fn test_claims_invalid_secret() {
        let token = Claims::new(Uuid::new_v4(), "pilot@example.com", 3600).encode("secret1").unwrap();
        assert!(matches!(Claims::decode(&token, "secret2"), Err(AppError::AuthError)));
    }

    #[test]
    fn test_expired_claims_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), "pilot@example.com", 0);
        claims.exp -= 3600;
        let token = claims.encode("test_secret").unwrap();
        assert!(matches!(Claims::decode(&token, "test_secret"), Err(AppError::AuthError)));
    }

    #[test]
    fn test_opaque_tokens_are_unique_and_hash_deterministically() {
        let token1 = OpaqueToken::generate();
        let token2 = OpaqueToken::generate();
        assert_ne!(token1, token2);
        assert_eq!(token1.len(), 43);

        assert_eq!(OpaqueToken::hash(&token1), OpaqueToken::hash(&token1));
        assert_ne!(OpaqueToken::hash(&token1), token1);
        assert_eq!(OpaqueToken::hash(&token1).len(), 64);
    }
}
