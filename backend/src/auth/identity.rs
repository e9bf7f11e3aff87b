//! Per-request identity
//!
//! The request authenticator stores an [`Identity`] in the request
//! extensions. Handlers take it back out as an extractor, either as
//! `Identity` (anonymous allowed) or [`RequireUser`] (anonymous rejected).

use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use book_catalog_shared::errors::AuthError;
use book_catalog_shared::models::{SessionId, UserId, UserSnapshot};
use std::convert::Infallible;

/// A user whose token resolved to a live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user: UserSnapshot,
    pub session_id: SessionId,
}

impl AuthenticatedUser {
    #[inline]
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedUser),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }

    pub fn authenticated(&self) -> Option<&AuthenticatedUser> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous => None,
        }
    }

    /// Demand an authenticated user
    pub fn require(self) -> Result<AuthenticatedUser, AuthError> {
        match self {
            Identity::Authenticated(user) => Ok(user),
            Identity::Anonymous => Err(AuthError::AuthenticationRequired),
        }
    }
}

// Routes mounted without the authenticator only ever see anonymous callers
fn identity_of(parts: &Parts) -> Identity {
    parts.extensions.get::<Identity>().cloned().unwrap_or_default()
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(identity_of(parts))
    }
}

/// Extractor for routes that need a logged-in user
///
/// Rejects anonymous requests with 403.
#[derive(Debug, Clone)]
pub struct RequireUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequireUser(identity_of(parts).require()?))
    }
}
