// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret. They are
//! self-contained: verification checks signature and expiry only, with no
//! storage round trip. The denormalized role/tenant claims are convenience
//! data for clients; authorization decisions always re-resolve the user
//! against storage and never trust them.

use std::time::Duration;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use crate::config::AuthConfig;
use crate::models::User;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id, as a string.
    pub sub: String,
    /// Role id at issuance time (informational only).
    #[serde(default)]
    pub role_id: Option<u64>,
    /// Enterprise id at issuance time (informational only).
    #[serde(default)]
    pub enterprise_id: Option<u64>,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp). Always `iat` + the configured TTL.
    pub exp: i64,
}

impl Claims {
    /// The subject parsed back to a user id, if numeric.
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }
}

/// Issues and verifies session tokens with a fixed secret and TTL.
///
/// Constructed once at startup from [`AuthConfig`]; the same key signs
/// and verifies for the whole process lifetime.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.token_ttl,
        }
    }

    /// Issue a signed token for an authenticated user.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            role_id: user.role_id,
            enterprise_id: user.enterprise_id,
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::Crypto(format!("token encode: {e}")))
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Purely stateless; no storage lookup is performed here.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

/// Parse a `Bearer <token>` authorization header. Returns `None` when the
/// header is missing or doesn't match the scheme.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserStatus;

    fn service(secret: &str, ttl_secs: u64) -> TokenService {
        TokenService::new(&AuthConfig {
            secret: secret.to_string(),
            token_ttl: Duration::from_secs(ttl_secs),
        })
    }

    fn sample_user(id: u64) -> User {
        let now = Utc::now();
        User {
            id,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            status: UserStatus::Active,
            role_id: Some(3),
            enterprise_id: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let service = service("secret-a", 3600);
        let token = service.issue(&sample_user(42)).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.role_id, Some(3));
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn expired_token_fails_verification() {
        let service = service("secret-a", 3600);
        // Issued two hours ago with a one-hour lifetime, well past leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "42".to_string(),
            role_id: None,
            enterprise_id: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = service.sign(&claims).unwrap();

        let result = service.verify(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn token_near_expiry_still_verifies() {
        let service = service("secret-a", 3600);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "42".to_string(),
            role_id: None,
            enterprise_id: None,
            iat: now - 3590,
            exp: now + 10,
        };
        let token = service.sign(&claims).unwrap();
        assert!(service.verify(&token).is_ok());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let issuer = service("secret-a", 3600);
        let verifier = service("secret-b", 3600);
        let token = issuer.issue(&sample_user(42)).unwrap();

        let result = verifier.verify(&token);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn malformed_token_fails_verification() {
        let service = service("secret-a", 3600);
        assert!(matches!(
            service.verify("not-a-jwt"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            service.verify(""),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn extract_bearer_parses_header_forms() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer   ".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }
}
