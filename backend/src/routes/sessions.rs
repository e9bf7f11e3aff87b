//! Session routes
//!
//! Login, session listing, logout and refresh-token exchange.

use crate::auth::RequireUser;
use crate::error::ApiResult;
use crate::services::SessionService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap},
    routing::post,
    Json, Router,
};
use book_catalog_shared::types::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshRequest, SessionListResponse, TokenPairResponse,
};

/// Create session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session).get(list_sessions).delete(delete_session))
        .route("/refresh", post(refresh_session))
}

/// Log in
///
/// POST /api/v1/sessions
///
/// The caller's user agent is recorded on the new session.
async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let response = SessionService::login(
        state.users.as_ref(),
        state.sessions.as_ref(),
        state.tokens(),
        &req,
        user_agent,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/sessions
async fn list_sessions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Json<SessionListResponse>> {
    Ok(Json(SessionService::list(state.sessions.as_ref(), &user).await?))
}

/// Log out of the current session
///
/// DELETE /api/v1/sessions
async fn delete_session(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Json<LogoutResponse>> {
    Ok(Json(SessionService::logout(state.sessions.as_ref(), &user).await?))
}

/// POST /api/v1/sessions/refresh
async fn refresh_session(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let pair = SessionService::refresh(state.authenticator(), &req.refresh_token).await?;
    Ok(Json(pair))
}
