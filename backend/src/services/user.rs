//! User registration
//!
//! Password hashing runs on the blocking thread pool.

use crate::auth::{normalize_email, PasswordService};
use crate::error::{is_unique_violation, ApiError};
use crate::repositories::{NewUser, UserStore};
use book_catalog_shared::types::{RegisterRequest, UserResponse};
use tracing::info;
use validator::Validate;

/// User account operations
pub struct UserService;

impl UserService {
    /// Register a new user
    ///
    /// Fails with 400 on invalid input and 409 when the email is taken.
    pub async fn register(users: &dyn UserStore, req: RegisterRequest) -> Result<UserResponse, ApiError> {
        req.validate()?;

        let email = normalize_email(&req.email);
        if users.email_exists(&email).await? {
            return Err(email_taken());
        }

        let password_hash = PasswordService::hash_async(req.password).await?;

        // A concurrent registration can win the race past `email_exists`
        let user = match users
            .create(NewUser {
                name: req.name.trim().to_string(),
                email,
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(email_taken()),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "Registered user");
        metrics::counter!("users_registered_total").increment(1);

        Ok(UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        })
    }
}

fn email_taken() -> ApiError {
    ApiError::Conflict("Email already registered".to_string())
}
