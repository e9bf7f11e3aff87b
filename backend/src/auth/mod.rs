//! Authentication and authorization
//!
//! JWT access/refresh tokens bound to revocable server-side sessions,
//! argon2 password hashing, and per-resource ownership checks.

mod credentials;
mod identity;
mod jwt;
mod middleware;
mod ownership;
mod password;

pub use credentials::{normalize_email, validate_credentials};
pub use identity::{AuthenticatedUser, Identity, RequireUser};
pub use jwt::{Claims, TokenError, TokenKind, TokenService};
pub use middleware::{
    authenticate, bearer_token, Authentication, Authenticator, Renewal, REFRESH_HEADER,
    REISSUED_TOKEN_HEADER,
};
pub use ownership::{authorize_owner, ensure_owner, OwnerAction, Owned, Ownership};
pub use password::PasswordService;
