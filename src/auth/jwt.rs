use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Access token claims. Permissions are deliberately absent; they are
/// resolved from the database on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user_id
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiration_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiration_seconds)).timestamp(),
        }
    }
}

/// Encode claims into a JWT token.
pub fn encode_token(claims: &Claims, secret: &str) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign access token: {e}")))
}

/// Decode and validate a JWT token (signature and expiry).
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-minimum-32-chars!!";

    #[test]
    fn test_encode_decode_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, 900);

        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.exp - decoded.iat, 900);
    }

    #[test]
    fn test_invalid_token_fails() {
        let result = decode_token("invalid.token.here", SECRET);
        assert!(result.unwrap_err().is_authentication_failure());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let claims = Claims::new(Uuid::new_v4(), 3600);
        let token = encode_token(&claims, "secret1-minimum-32-characters!!").unwrap();
        let result = decode_token(&token, "secret2-minimum-32-characters!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode_token(&claims, SECRET).unwrap();
        let err = decode_token(&token, SECRET).unwrap_err();
        assert_eq!(err.code(), "INVALID_TOKEN");
    }
}
