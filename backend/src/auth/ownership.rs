//! Ownership checks for user-owned resources
//!
//! Mutations on an owned resource are allowed for its owner only. The check
//! runs after the resource has been fetched, so a missing resource is a 404
//! before it can ever be a 401.

use super::identity::AuthenticatedUser;
use crate::error::ApiError;
use book_catalog_shared::models::{Book, UserId};
use std::fmt;

/// A resource with exactly one owning user
pub trait Owned {
    /// Singular noun used in messages, e.g. "book"
    const KIND: &'static str;

    fn owner_id(&self) -> UserId;

    /// Path where `owner` can list the ids of everything they own
    fn owner_listing(owner: UserId) -> String;
}

impl Owned for Book {
    const KIND: &'static str = "book";

    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn owner_listing(owner: UserId) -> String {
        format!("/api/v1/books/user/{}", owner)
    }
}

/// Mutation being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerAction {
    Update,
    Delete,
}

impl fmt::Display for OwnerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OwnerAction::Update => "update",
            OwnerAction::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Allowed,
    Denied,
}

/// Decide whether `requester` may mutate `resource`
pub fn authorize_owner<R: Owned>(resource: &R, requester: UserId) -> Ownership {
    if resource.owner_id() == requester {
        Ownership::Allowed
    } else {
        Ownership::Denied
    }
}

/// [`authorize_owner`] as a handler guard; denial becomes a 401 that tells
/// the caller where to find the ids they do own.
pub fn ensure_owner<R: Owned>(
    resource: &R,
    requester: &AuthenticatedUser,
    action: OwnerAction,
) -> Result<(), ApiError> {
    match authorize_owner(resource, requester.user_id()) {
        Ownership::Allowed => Ok(()),
        Ownership::Denied => Err(ApiError::Unauthorized(format!(
            "Only the {kind}'s owner is authorized to perform this operation. \
             One logged-in user is not permitted to {action} another user's {kind}; \
             supply the {kind} ID of any {kind} you created. \
             Find your {kind}s with their IDs at: GET {listing}",
            kind = R::KIND,
            action = action,
            listing = R::owner_listing(requester.user_id()),
        ))),
    }
}
