//! API request and response types
//!
//! Everything here crosses the wire as camelCase JSON.

use crate::models::{Book, BookId, Session, UserId, UserSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Users and sessions
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Not a valid email"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password too short - should be 6 chars minimum"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Registered user, as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserSnapshot,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh token exchange request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Rotated token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Valid sessions of the requester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub count: usize,
    pub sessions: Vec<Session>,
}

/// Logout result; both tokens are always null
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

// ============================================================================
// Books
// ============================================================================

/// Follow-up hint attached to book responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLink {
    #[serde(rename = "type")]
    pub method: String,
    pub url: String,
    pub description: String,
}

/// Reference to a book's owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: UserId,
}

/// Book as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub pdf: String,
    pub owner: OwnerRef,
    pub request: RequestLink,
}

impl BookResponse {
    pub fn from_book(book: Book, request: RequestLink) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
            pdf: book.pdf,
            owner: OwnerRef { id: book.owner_id },
            request,
        }
    }
}

/// Acting user echoed back on mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: UserId,
    pub name: String,
}

/// Result of creating or updating a book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMutationResponse {
    pub message: String,
    pub user: ActingUser,
    pub book: BookResponse,
}

/// Result of deleting a book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDeletedResponse {
    pub message: String,
    pub user: ActingUser,
    pub request: RequestLink,
}

/// Books uploaded by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListResponse {
    pub count: usize,
    pub description: String,
    pub books: Vec<BookResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirmation: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(register("secret1", "secret1", "a@x.com").validate().is_ok());
    }

    #[test]
    fn test_register_request_mismatched_confirmation() {
        let errors = register("secret1", "secret2", "a@x.com").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirmation"));
    }

    #[test]
    fn test_register_request_bad_email() {
        let errors = register("secret1", "secret1", "not-an-email").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_register_request_uses_camel_case() {
        let json = r#"{"name":"Ada","email":"a@x.com","password":"secret1","passwordConfirmation":"secret1"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.password_confirmation, "secret1");
    }

    #[test]
    fn test_logout_response_serializes_nulls() {
        let json = serde_json::to_value(LogoutResponse::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "accessToken": null, "refreshToken": null }));
    }

    #[test]
    fn test_request_link_uses_type_key() {
        let link = RequestLink {
            method: "GET".to_string(),
            url: "http://localhost/books".to_string(),
            description: "List".to_string(),
        };
        let json = serde_json::to_value(link).unwrap();
        assert_eq!(json["type"], "GET");
    }
}
