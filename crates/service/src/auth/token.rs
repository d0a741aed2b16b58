//! Token issuance: HS256 JWTs carrying the user's email and role.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::AuthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self { secret: secret.into(), ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn issue(&self, email: &str, role: Option<&str>) -> Result<String, AuthError> {
        let now = Utc::now().timestamp().max(0) as usize;
        let claims = Claims {
            sub: email.to_string(),
            role: role.map(str::to_string),
            iat: now,
            exp: now + self.ttl_secs as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret_only() {
        let issuer = TokenIssuer::new("s3cret", 60);
        let token = issuer.issue("a@b.com", Some("admin")).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.exp - claims.iat, 60);

        let other = TokenIssuer::new("different", 60);
        assert!(matches!(other.verify(&token), Err(AuthError::TokenError(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("s3cret", 60);
        let now = Utc::now().timestamp() as usize;
        let claims = Claims { sub: "u".into(), role: None, iat: now - 7200, exp: now - 3600 };
        let key = EncodingKey::from_secret(b"s3cret");
        let token = encode(&Header::default(), &claims, &key).unwrap();
        assert!(issuer.verify(&token).is_err());
    }
}
