//! Session repository for database operations

use super::{SessionFilter, SessionStore};
use anyhow::{bail, Result};
use async_trait::async_trait;
use book_catalog_shared::models::{Session, SessionId, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Session record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_agent: String,
    pub valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRecord> for Session {
    fn from(r: SessionRecord) -> Self {
        Session {
            id: SessionId(r.id),
            user_id: UserId(r.user_id),
            user_agent: r.user_agent,
            valid: r.valid,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Postgres-backed session store
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create_session(&self, user_id: UserId, user_agent: &str) -> Result<Session> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO sessions (user_id, user_agent)
            VALUES ($1, $2)
            RETURNING id, user_id, user_agent, valid, created_at, updated_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    async fn find_session(&self, id: SessionId) -> Result<Option<Session>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, user_agent, valid, created_at, updated_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Session::from))
    }

    async fn find_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let records = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, user_agent, valid, created_at, updated_at
            FROM sessions
            WHERE ($1::uuid IS NULL OR id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::boolean IS NULL OR valid = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.id.map(|id| id.as_uuid()))
        .bind(filter.user_id.map(|id| id.as_uuid()))
        .bind(filter.valid)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Session::from).collect())
    }

    async fn invalidate_sessions(&self, filter: &SessionFilter) -> Result<u64> {
        if !filter.is_targeted() {
            bail!("refusing to invalidate sessions without a session or user id");
        }

        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET valid = FALSE, updated_at = NOW()
            WHERE valid = TRUE
              AND ($1::uuid IS NULL OR id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::boolean IS NULL OR valid = $3)
            "#,
        )
        .bind(filter.id.map(|id| id.as_uuid()))
        .bind(filter.user_id.map(|id| id.as_uuid()))
        .bind(filter.valid)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
