use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::domain::Claims;
use super::errors::AuthError;
use crate::model::User;

const BEARER_PREFIX: &str = "Bearer ";
/// Upper bound on token lifetime (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` when the value is absent, uses another scheme, or carries
/// an empty token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix(BEARER_PREFIX)?;
    let token = token.split(' ').next().unwrap_or_default();
    if token.is_empty() { None } else { Some(token) }
}

/// HS256 signing and verification with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        }
    }

    /// Sign a token for `user`; returns the token and its expiry (epoch seconds).
    pub fn issue(&self, user: &User) -> Result<(String, i64), AuthError> {
        let now = Utc::now();
        let exp = (now + self.ttl).timestamp();
        let claims = Claims {
            user_id: Some(user.id.clone()),
            sub: Some(user.email.clone()),
            role: Some(user.role.as_str().to_string()),
            iat: Some(now.timestamp()),
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok((token, exp))
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer abc extra")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn issued_token_verifies_and_carries_user_id() {
        let codec = TokenCodec::new("secret", 60);
        let user = User::new("user1", "Alice", "alice@example.com", "password", Role::User);
        let (token, exp) = codec.issue(&user).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("user1"));
        assert_eq!(claims.role.as_deref(), Some("user"));
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn wrong_secret_and_expired_tokens_fail() {
        let user = User::new("user1", "Alice", "alice@example.com", "password", Role::User);
        let (token, _) = TokenCodec::new("secret", 60).issue(&user).unwrap();
        assert!(matches!(TokenCodec::new("other", 60).verify(&token), Err(AuthError::TokenError(_))));

        let expired = Claims { user_id: Some("user1".into()), sub: None, role: None, iat: None, exp: Utc::now().timestamp() - 120 };
        let token = encode(&Header::default(), &expired, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(TokenCodec::new("secret", 60).verify(&token).is_err());
    }
}
