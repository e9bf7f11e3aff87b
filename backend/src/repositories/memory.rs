//! In-memory stores
//!
//! Same contracts as the Postgres repositories, kept in process memory.
//! Used by the test suite and for running the API without a database.

use super::{BookChanges, BookStore, NewBook, NewUser, SessionFilter, SessionStore, UserStore};
use anyhow::{bail, Result};
use async_trait::async_trait;
use book_catalog_shared::models::{Book, BookId, Session, SessionId, User, UserId};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            bail!("duplicate key value violates unique constraint \"users_email_key\"");
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, user_id: UserId, user_agent: &str) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: SessionId::new(),
            user_id,
            user_agent: user_agent.to_string(),
            valid: true,
            created_at: now,
            updated_at: now,
        };
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: SessionId) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn invalidate_sessions(&self, filter: &SessionFilter) -> Result<u64> {
        if !filter.is_targeted() {
            bail!("refusing to invalidate sessions without a session or user id");
        }

        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for session in sessions.values_mut() {
            if session.valid && filter.matches(session) {
                session.valid = false;
                session.updated_at = now;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[derive(Default)]
pub struct InMemoryBookStore {
    books: RwLock<HashMap<BookId, Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn create(&self, book: NewBook) -> Result<Book> {
        let now = Utc::now();
        let book = Book {
            id: BookId::new(),
            owner_id: book.owner_id,
            title: book.title,
            description: book.description,
            pdf: book.pdf,
            created_at: now,
            updated_at: now,
        };
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>> {
        let books = self.books.read().await;
        let mut owned: Vec<Book> = books
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update(&self, id: BookId, changes: &BookChanges) -> Result<Option<Book>> {
        let mut books = self.books.write().await;
        let Some(book) = books.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            book.title = title.clone();
        }
        if let Some(description) = &changes.description {
            book.description = description.clone();
        }
        if let Some(pdf) = &changes.pdf {
            book.pdf = pdf.clone();
        }
        book.updated_at = Utc::now();
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        Ok(self.books.write().await.remove(&id).is_some())
    }
}
