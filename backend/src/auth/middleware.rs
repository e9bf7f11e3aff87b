//! Request authentication
//!
//! Every request passes through [`authenticate`]. It never rejects: a
//! missing, malformed or expired token, or a token whose session has been
//! invalidated, yields [`Identity::Anonymous`]. Routes that need a user
//! say so with the `RequireUser` extractor.
//!
//! An expired access token can be renewed in-flight when the client also
//! sends its refresh token in the `x-refresh` header; the new access token
//! is returned in the `x-access-token` response header.

use super::identity::{AuthenticatedUser, Identity};
use super::jwt::{Claims, TokenError, TokenService};
use crate::error::ApiError;
use crate::repositories::{SessionStore, UserStore};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use book_catalog_shared::errors::AuthError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request header carrying a refresh token for in-flight renewal
pub const REFRESH_HEADER: &str = "x-refresh";
/// Response header carrying a renewed access token
pub const REISSUED_TOKEN_HEADER: &str = "x-access-token";

/// Outcome of authenticating one request
#[derive(Debug, Clone, Default)]
pub struct Authentication {
    pub identity: Identity,
    pub reissued_access_token: Option<String>,
}

impl Authentication {
    fn anonymous() -> Self {
        Self::default()
    }
}

/// A fresh access token minted from a refresh token
#[derive(Debug, Clone)]
pub struct Renewal {
    pub user: AuthenticatedUser,
    pub access_token: String,
}

/// Resolves bearer tokens to identities against the session store
#[derive(Clone)]
pub struct Authenticator {
    tokens: TokenService,
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(tokens: TokenService, sessions: Arc<dyn SessionStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            tokens,
            sessions,
            users,
        }
    }

    /// Work out who sent a request from its headers
    pub async fn authenticate(&self, headers: &HeaderMap) -> Authentication {
        let Some(token) = bearer_token(headers) else {
            return Authentication::anonymous();
        };

        match self.tokens.verify_access_token(token) {
            Ok(claims) => Authentication {
                identity: self.resolve(&claims).await,
                reissued_access_token: None,
            },
            Err(TokenError::Expired) => match header_str(headers, REFRESH_HEADER) {
                Some(refresh_token) => self.renew_in_flight(refresh_token).await,
                None => Authentication::anonymous(),
            },
            Err(e) => {
                debug!(error = %e, "Ignoring unusable bearer token");
                Authentication::anonymous()
            }
        }
    }

    /// Map verified claims to an identity. The token only counts if its
    /// session exists, is still valid and belongs to the token's user.
    pub async fn resolve(&self, claims: &Claims) -> Identity {
        match self.sessions.find_session(claims.session).await {
            Ok(Some(session)) if session.valid && session.user_id == claims.sub => {
                Identity::Authenticated(AuthenticatedUser {
                    user: claims.user(),
                    session_id: session.id,
                })
            }
            Ok(_) => {
                debug!(session_id = %claims.session, "Token references a dead session");
                Identity::Anonymous
            }
            Err(e) => {
                warn!(error = ?e, session_id = %claims.session, "Session lookup failed");
                Identity::Anonymous
            }
        }
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The refresh token's session must still be live and its user must
    /// still exist; the new token carries the user's current details.
    pub async fn renew(&self, refresh_token: &str) -> Result<Renewal, ApiError> {
        let claims = self.tokens.verify_refresh_token(refresh_token).map_err(|e| {
            debug!(error = %e, "Rejected refresh token");
            ApiError::from(AuthError::InvalidRefreshToken)
        })?;

        let session = self
            .sessions
            .find_session(claims.session)
            .await?
            .filter(|s| s.valid && s.user_id == claims.sub)
            .ok_or(AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?
            .snapshot();

        let access_token = self
            .tokens
            .sign_access_token(&user, session.id)
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(Renewal {
            user: AuthenticatedUser {
                user,
                session_id: session.id,
            },
            access_token,
        })
    }

    async fn renew_in_flight(&self, refresh_token: &str) -> Authentication {
        match self.renew(refresh_token).await {
            Ok(renewal) => {
                debug!(session_id = %renewal.user.session_id, "Reissued expired access token");
                Authentication {
                    identity: Identity::Authenticated(renewal.user),
                    reissued_access_token: Some(renewal.access_token),
                }
            }
            Err(e) => {
                debug!(error = %e, "Could not renew expired access token");
                Authentication::anonymous()
            }
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, AUTHORIZATION.as_str())?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware attaching an [`Identity`] to every request
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Authentication {
        identity,
        reissued_access_token,
    } = state.authenticator().authenticate(request.headers()).await;

    request.extensions_mut().insert(identity);
    let mut response = next.run(request).await;

    if let Some(token) = reissued_access_token {
        match HeaderValue::from_str(&token) {
            Ok(value) => {
                response.headers_mut().insert(REISSUED_TOKEN_HEADER, value);
            }
            Err(e) => warn!(error = %e, "Reissued token is not a valid header value"),
        }
    }

    response
}
