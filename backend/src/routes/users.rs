//! User registration route

use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use book_catalog_shared::types::{RegisterRequest, UserResponse};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", post(register))
}

/// Register a new user
///
/// POST /api/v1/users
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = UserService::register(state.users.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
