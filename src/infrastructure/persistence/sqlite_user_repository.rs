use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::application::ports::{RepositoryError, UserRepository};
use crate::domain::{RecentFeed, UsageCounter, User};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, subject: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT subject, full_name, email, recent_feeds, usage_date, usage_count
            FROM users
            WHERE subject = ?1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_user).transpose()
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, RepositoryError> {
    let query_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let recent_feeds: String = row.try_get("recent_feeds").map_err(query_err)?;
    let recent_feeds: Vec<RecentFeed> = serde_json::from_str(&recent_feeds)
        .map_err(|e| RepositoryError::QueryFailed(format!("recent_feeds column: {}", e)))?;

    let usage_date: String = row.try_get("usage_date").map_err(query_err)?;
    let usage_date = NaiveDate::parse_from_str(&usage_date, DATE_FORMAT)
        .map_err(|e| RepositoryError::QueryFailed(format!("usage_date column: {}", e)))?;
    let usage_count: i64 = row.try_get("usage_count").map_err(query_err)?;

    Ok(User {
        subject: row.try_get("subject").map_err(query_err)?,
        full_name: row.try_get("full_name").map_err(query_err)?,
        email: row.try_get("email").map_err(query_err)?,
        recent_feeds,
        usage: UsageCounter {
            date: usage_date,
            count: usage_count.max(0) as u32,
        },
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self))]
    async fn upsert_profile(
        &self,
        subject: &str,
        full_name: &str,
        email: &str,
    ) -> Result<User, RepositoryError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO users (subject, full_name, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(subject) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(subject)
        .bind(full_name)
        .bind(email)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        self.fetch(subject)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(subject.to_string()))
    }

    #[instrument(skip(self))]
    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch(subject).await
    }

    #[instrument(skip(self))]
    async fn ensure_exists(&self, subject: &str) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO users (subject, created_at, updated_at)
            VALUES (?1, ?2, ?2)
            ON CONFLICT(subject) DO NOTHING
            "#,
        )
        .bind(subject)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, feeds))]
    async fn set_recent_feeds(
        &self,
        subject: &str,
        feeds: &[RecentFeed],
    ) -> Result<(), RepositoryError> {
        let encoded = serde_json::to_string(feeds)
            .map_err(|e| RepositoryError::QueryFailed(format!("recent_feeds encode: {}", e)))?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE users SET recent_feeds = ?1, updated_at = ?2 WHERE subject = ?3",
        )
        .bind(encoded)
        .bind(&now)
        .bind(subject)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(subject.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_usage_if_new_day(
        &self,
        subject: &str,
        today: NaiveDate,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE users
            SET usage_count = 0, usage_date = ?1
            WHERE subject = ?2 AND usage_date < ?1
            "#,
        )
        .bind(today.format(DATE_FORMAT).to_string())
        .bind(subject)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn try_increment_usage(
        &self,
        subject: &str,
        ceiling: u32,
    ) -> Result<bool, RepositoryError> {
        // Single conditional write; rows_affected tells us whether the
        // counter was still below the ceiling.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET usage_count = usage_count + 1
            WHERE subject = ?1 AND usage_count < ?2
            "#,
        )
        .bind(subject)
        .bind(i64::from(ceiling))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
