//! Identity resolution seam.
//!
//! Credentials are issued by the upstream identity provider; this service
//! only verifies the bearer JWT locally and hands back the opaque subject id.
//! A missing or invalid credential on read paths means "anonymous", which the
//! middleware layer handles — verification itself is strict.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Verified claims carried by a bearer credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (opaque user id)
    pub sub: Uuid,
    /// Operator flag for the audit read surface
    #[serde(default)]
    pub is_admin: bool,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Identity service
pub struct IdentityService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityService {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Verify a bearer token and return its claims.
    pub fn resolve_bearer(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret";

    fn token_for(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn valid_claims() -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            is_admin: false,
            iat: now,
            exp: now + 3600,
        }
    }

    #[test]
    fn test_resolve_bearer_round_trip() {
        let service = IdentityService::new(SECRET);
        let claims = valid_claims();
        let resolved = service.resolve_bearer(&token_for(&claims, SECRET)).unwrap();
        assert_eq!(resolved.sub, claims.sub);
        assert!(!resolved.is_admin);
    }

    #[test]
    fn test_resolve_bearer_rejects_wrong_secret() {
        let service = IdentityService::new(SECRET);
        let token = token_for(&valid_claims(), "some-other-secret");
        assert!(service.resolve_bearer(&token).is_err());
    }

    #[test]
    fn test_resolve_bearer_rejects_expired_token() {
        let service = IdentityService::new(SECRET);
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            is_admin: false,
            iat: now - 7200,
            exp: now - 3600,
        };
        assert!(service.resolve_bearer(&token_for(&claims, SECRET)).is_err());
    }

    #[test]
    fn test_resolve_bearer_rejects_garbage() {
        let service = IdentityService::new(SECRET);
        assert!(service.resolve_bearer("not-a-jwt").is_err());
    }

    #[test]
    fn test_is_admin_defaults_to_false_when_absent() {
        // Tokens minted before the operator flag existed carry no is_admin.
        let now = chrono::Utc::now().timestamp();
        let sub = Uuid::new_v4();
        let legacy = serde_json::json!({"sub": sub, "iat": now, "exp": now + 3600});
        let token = encode(
            &Header::default(),
            &legacy,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let service = IdentityService::new(SECRET);
        let resolved = service.resolve_bearer(&token).unwrap();
        assert_eq!(resolved.sub, sub);
        assert!(!resolved.is_admin);
    }
}
