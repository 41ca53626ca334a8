//! Bearer-token issuance and verification.
//!
//! Tokens are HS256-signed JWTs. The only identity claim is the subject
//! (the user's id); token cryptography itself is delegated to the
//! `jsonwebtoken` crate.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use critique_common::{AppError, AppResult};

/// JWT claims embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Token service for issuing and verifying bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a new token service from the signing secret.
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Any failure (bad signature, expired, malformed) is an authentication
    /// failure, not a server error.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_round_trip() {
        let service = TokenService::new("test-secret", 24);

        let token = service.issue("user1").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, "user1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let service = TokenService::new("test-secret", 24);
        let other = TokenService::new("other-secret", 24);

        let token = other.issue("user1").unwrap();
        let result = service.verify(&token);

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn verify_rejects_garbage() {
        let service = TokenService::new("test-secret", 24);

        assert!(matches!(
            service.verify("not-a-token"),
            Err(AppError::Unauthorized)
        ));
    }
}
