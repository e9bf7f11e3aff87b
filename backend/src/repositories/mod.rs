//! Data access layer
//!
//! Each store is a trait so services and the request authenticator can run
//! against Postgres in production and the in-memory stores in tests.

use anyhow::Result;
use async_trait::async_trait;
use book_catalog_shared::models::{Book, BookId, Session, SessionId, User, UserId};

pub mod book;
pub mod memory;
pub mod session;
pub mod user;

pub use book::BookRepository;
pub use memory::{InMemoryBookStore, InMemorySessionStore, InMemoryUserStore};
pub use session::SessionRepository;
pub use user::UserRepository;

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registered users and their credentials
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
}

/// Filter over session records. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub id: Option<SessionId>,
    pub user_id: Option<UserId>,
    pub valid: Option<bool>,
}

impl SessionFilter {
    pub fn by_id(id: SessionId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Sessions of `user_id` that can still authenticate
    pub fn valid_for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            valid: Some(true),
            ..Default::default()
        }
    }

    /// Whether the filter names a session or a user
    pub fn is_targeted(&self) -> bool {
        self.id.is_some() || self.user_id.is_some()
    }

    pub fn matches(&self, session: &Session) -> bool {
        self.id.map_or(true, |id| session.id == id)
            && self.user_id.map_or(true, |user_id| session.user_id == user_id)
            && self.valid.map_or(true, |valid| session.valid == valid)
    }
}

/// Login sessions. Records are never deleted, only invalidated.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, user_id: UserId, user_agent: &str) -> Result<Session>;
    async fn find_session(&self, id: SessionId) -> Result<Option<Session>>;
    async fn find_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>>;
    /// Set `valid = false` on every matching session, returning how many
    /// were live before the call. Repeating the call is harmless.
    async fn invalidate_sessions(&self, filter: &SessionFilter) -> Result<u64>;
}

/// Input for creating a book
#[derive(Debug, Clone)]
pub struct NewBook {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub pdf: String,
}

/// Partial update of a book; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub pdf: Option<String>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.pdf.is_none()
    }

    /// Whether applying these changes would alter `book`
    pub fn differs_from(&self, book: &Book) -> bool {
        self.title.as_ref().is_some_and(|t| *t != book.title)
            || self.description.as_ref().is_some_and(|d| *d != book.description)
            || self.pdf.as_ref().is_some_and(|p| *p != book.pdf)
    }
}

/// Book records
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: NewBook) -> Result<Book>;
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>>;
    /// Apply `changes`; `None` if the book no longer exists
    async fn update(&self, id: BookId, changes: &BookChanges) -> Result<Option<Book>>;
    /// Delete; `false` if the book did not exist
    async fn delete(&self, id: BookId) -> Result<bool>;
}
