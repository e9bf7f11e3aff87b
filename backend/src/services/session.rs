//! Login sessions
//!
//! A login creates a session record and signs an access/refresh token pair
//! bound to it. Logging out flips the session's `valid` flag, after which
//! neither token authenticates again.

use crate::auth::{validate_credentials, AuthenticatedUser, Authenticator, TokenService};
use crate::error::ApiError;
use crate::repositories::{SessionFilter, SessionStore, UserStore};
use book_catalog_shared::models::{SessionId, UserSnapshot};
use book_catalog_shared::types::{
    LoginRequest, LoginResponse, LogoutResponse, SessionListResponse, TokenPairResponse,
};
use tracing::{debug, info};

/// Session lifecycle operations
pub struct SessionService;

impl SessionService {
    /// Verify credentials, open a session and issue its tokens
    pub async fn login(
        users: &dyn UserStore,
        sessions: &dyn SessionStore,
        tokens: &TokenService,
        req: &LoginRequest,
        user_agent: &str,
    ) -> Result<LoginResponse, ApiError> {
        let user = match validate_credentials(users, &req.email, &req.password).await {
            Ok(user) => user,
            Err(e) => {
                metrics::counter!("logins_failed_total").increment(1);
                return Err(e);
            }
        };

        let session = sessions.create_session(user.id, user_agent).await?;
        let (access_token, refresh_token) = Self::sign_pair(tokens, &user, session.id)?;

        info!(user_id = %user.id, session_id = %session.id, "User logged in");
        metrics::counter!("logins_total").increment(1);

        Ok(LoginResponse {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Valid sessions of the requester
    pub async fn list(
        sessions: &dyn SessionStore,
        requester: &AuthenticatedUser,
    ) -> Result<SessionListResponse, ApiError> {
        let sessions = sessions
            .find_sessions(&SessionFilter::valid_for_user(requester.user_id()))
            .await?;

        Ok(SessionListResponse {
            count: sessions.len(),
            sessions,
        })
    }

    /// Invalidate the requester's current session
    pub async fn logout(
        sessions: &dyn SessionStore,
        requester: &AuthenticatedUser,
    ) -> Result<LogoutResponse, ApiError> {
        let invalidated = sessions
            .invalidate_sessions(&SessionFilter::by_id(requester.session_id))
            .await?;

        if invalidated == 0 {
            debug!(session_id = %requester.session_id, "Session was already invalid");
        } else {
            info!(user_id = %requester.user_id(), session_id = %requester.session_id, "User logged out");
        }
        metrics::counter!("logouts_total").increment(1);

        Ok(LogoutResponse::default())
    }

    /// Exchange a refresh token for a new token pair on the same session
    pub async fn refresh(authenticator: &Authenticator, refresh_token: &str) -> Result<TokenPairResponse, ApiError> {
        let renewal = authenticator.renew(refresh_token).await?;
        let refresh_token = authenticator
            .tokens()
            .sign_refresh_token(&renewal.user.user, renewal.user.session_id)
            .map_err(|e| anyhow::anyhow!(e))?;

        debug!(session_id = %renewal.user.session_id, "Rotated token pair");
        metrics::counter!("token_refreshes_total").increment(1);

        Ok(TokenPairResponse {
            access_token: renewal.access_token,
            refresh_token,
        })
    }

    fn sign_pair(tokens: &TokenService, user: &UserSnapshot, session: SessionId) -> Result<(String, String), ApiError> {
        let access = tokens
            .sign_access_token(user, session)
            .map_err(|e| anyhow::anyhow!(e))?;
        let refresh = tokens
            .sign_refresh_token(user, session)
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok((access, refresh))
    }
}
