//! Email/password verification

use super::PasswordService;
use crate::error::ApiError;
use crate::repositories::UserStore;
use book_catalog_shared::errors::AuthError;
use book_catalog_shared::models::UserSnapshot;
use tracing::debug;

/// Well-formed hash with the default Argon2 parameters. Unknown emails are
/// verified against it so they cost as much as a wrong password.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Ym9vay1jYXRhbG9nLWR1bQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Canonical form of an email address for lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check an email/password pair against the stored hash.
///
/// Unknown email and wrong password fail with the same
/// [`AuthError::InvalidCredentials`]. Only store failures surface as
/// something else.
pub async fn validate_credentials(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<UserSnapshot, ApiError> {
    let Some(user) = users.find_by_email(&normalize_email(email)).await? else {
        debug!("Login attempt for unknown email");
        PasswordService::verify_async(password.to_string(), DUMMY_PASSWORD_HASH.to_string()).await?;
        return Err(AuthError::InvalidCredentials.into());
    };

    let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone()).await?;
    if !valid {
        debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(user.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryUserStore, NewUser};

    async fn store_with_user(email: &str, password: &str) -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store
            .create(NewUser {
                name: "Ada".to_string(),
                email: email.to_string(),
                password_hash: PasswordService::hash(password).unwrap(),
            })
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_dummy_hash_matches_real_hash_parameters() {
        let real = PasswordService::hash("secret1").unwrap();
        let params = |hash: &str| hash.split('$').take(4).collect::<Vec<_>>().join("$");

        assert!(argon2::PasswordHash::new(DUMMY_PASSWORD_HASH).is_ok());
        assert_eq!(params(DUMMY_PASSWORD_HASH), params(&real));
        assert!(!PasswordService::verify("secret1", DUMMY_PASSWORD_HASH));
    }

    #[tokio::test]
    async fn test_correct_credentials_return_identity() {
        let store = store_with_user("a@x.com", "secret1").await;

        let user = validate_credentials(&store, "a@x.com", "secret1").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "Ada");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let store = store_with_user("a@x.com", "secret1").await;

        assert!(validate_credentials(&store, " A@X.com ", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_fail_identically() {
        let store = store_with_user("a@x.com", "secret1").await;

        let wrong_password = validate_credentials(&store, "a@x.com", "nope").await.unwrap_err();
        let unknown_email = validate_credentials(&store, "b@x.com", "secret1").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, ApiError::Unauthorized(ref m) if m == "Invalid email or password"));
    }
}
