//! Book repository for database operations

use super::{BookChanges, BookStore, NewBook};
use anyhow::Result;
use async_trait::async_trait;
use book_catalog_shared::models::{Book, BookId, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Book record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub pdf: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookRecord> for Book {
    fn from(r: BookRecord) -> Self {
        Book {
            id: BookId(r.id),
            owner_id: UserId(r.owner_id),
            title: r.title,
            description: r.description,
            pdf: r.pdf,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Postgres-backed book store
#[derive(Clone)]
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BookRepository {
    async fn create(&self, book: NewBook) -> Result<Book> {
        let record = sqlx::query_as::<_, BookRecord>(
            r#"
            INSERT INTO books (owner_id, title, description, pdf)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, description, pdf, created_at, updated_at
            "#,
        )
        .bind(book.owner_id.as_uuid())
        .bind(&book.title)
        .bind(&book.description)
        .bind(&book.pdf)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(
            r#"
            SELECT id, owner_id, title, description, pdf, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Book::from))
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>> {
        let records = sqlx::query_as::<_, BookRecord>(
            r#"
            SELECT id, owner_id, title, description, pdf, created_at, updated_at
            FROM books
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Book::from).collect())
    }

    async fn update(&self, id: BookId, changes: &BookChanges) -> Result<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                pdf = COALESCE($4, pdf),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, title, description, pdf, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.pdf)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Book::from))
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
