//! JWT token signing and verification
//!
//! Tokens carry a snapshot of the user's identity plus the id of the
//! session they were issued for. The service is stateless: it checks
//! signature, shape and expiry only. Session liveness is decided by the
//! request authenticator.

use book_catalog_shared::models::{SessionId, UserId, UserSnapshot};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Which of the two per-login tokens this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    pub name: String,
    pub email: String,
    /// Session this token was issued for
    pub session: SessionId,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub token_type: TokenKind,
}

impl Claims {
    pub fn user(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.sub,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Why a token was not honored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("expected a {expected} token")]
    WrongKind { expected: &'static str },

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Signs and verifies access and refresh tokens
#[derive(Clone)]
pub struct TokenService {
    keys: JwtKeys,
    validation: Arc<Validation>,
    access_token_expiry_secs: i64,
    refresh_token_expiry_secs: i64,
}

impl TokenService {
    /// Call this once at application startup and store in AppState.
    pub fn new(secret: &str, access_token_expiry_secs: i64, refresh_token_expiry_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; a token is dead the second it expires
        validation.leeway = 0;

        Self {
            keys: JwtKeys::new(secret),
            validation: Arc::new(validation),
            access_token_expiry_secs,
            refresh_token_expiry_secs,
        }
    }

    /// Sign an access token for `user` bound to `session`
    #[inline]
    pub fn sign_access_token(&self, user: &UserSnapshot, session: SessionId) -> Result<String, TokenError> {
        self.sign(user, session, TokenKind::Access, self.access_token_expiry_secs)
    }

    /// Sign a refresh token for `user` bound to `session`
    #[inline]
    pub fn sign_refresh_token(&self, user: &UserSnapshot, session: SessionId) -> Result<String, TokenError> {
        self.sign(user, session, TokenKind::Refresh, self.refresh_token_expiry_secs)
    }

    fn sign(
        &self,
        user: &UserSnapshot,
        session: SessionId,
        kind: TokenKind,
        expiry_secs: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expiry_secs);

        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            session,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Verify a token and require it to be an access token
    #[inline]
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_kind(token, TokenKind::Access)
    }

    /// Verify a token and require it to be a refresh token
    #[inline]
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongKind {
                expected: expected.as_str(),
            });
        }
        Ok(claims)
    }

    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_service() -> TokenService {
        TokenService::new("test-secret", 3600, 604800)
    }

    fn user() -> UserSnapshot {
        UserSnapshot {
            id: UserId::new(),
            name: "Ada".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_sign_and_verify_access_token() {
        let service = create_test_service();
        let user = user();
        let session = SessionId::new();

        let token = service.sign_access_token(&user, session).unwrap();
        let claims = service.verify_access_token(&token).unwrap();

        assert_eq!(claims.user(), user);
        assert_eq!(claims.session, session);
        assert_eq!(claims.token_type, TokenKind::Access);
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let service = create_test_service();
        let user = user();
        let session = SessionId::new();

        let access = service.verify(&service.sign_access_token(&user, session).unwrap()).unwrap();
        let refresh = service.verify(&service.sign_refresh_token(&user, session).unwrap()).unwrap();

        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let token = service.sign_access_token(&user(), SessionId::new()).unwrap();

        let result = service.verify_refresh_token(&token);
        assert_eq!(result.unwrap_err(), TokenError::WrongKind { expected: "refresh" });
    }

    #[test]
    fn test_malformed_token_rejected() {
        let service = create_test_service();
        assert_eq!(service.verify("invalid.token.here").unwrap_err(), TokenError::Malformed);
        assert_eq!(service.verify("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let service = create_test_service();
        let other = TokenService::new("another-secret", 3600, 604800);
        let token = other.sign_access_token(&user(), SessionId::new()).unwrap();

        assert_eq!(service.verify(&token).unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn test_expired_token_rejected_despite_valid_signature() {
        let service = TokenService::new("test-secret", -10, -10);
        let token = service.sign_access_token(&user(), SessionId::new()).unwrap();

        assert_eq!(service.verify_access_token(&token).unwrap_err(), TokenError::Expired);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Any token whose expiry lies in the past fails with `Expired`
        #[test]
        fn prop_expired_tokens_always_rejected(ttl in -100_000i64..-1) {
            let service = TokenService::new("test-secret", ttl, ttl);
            let token = service.sign_access_token(&user(), SessionId::new()).unwrap();
            prop_assert_eq!(service.verify(&token).unwrap_err(), TokenError::Expired);
        }

        /// Verification never panics on arbitrary input
        #[test]
        fn prop_verify_garbage_is_an_error(s in "\\PC{0,200}") {
            let service = create_test_service();
            prop_assert!(service.verify(&s).is_err());
        }
    }
}
