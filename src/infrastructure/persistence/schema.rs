use sqlx::{Row, SqlitePool};
use tracing::{info, instrument};

use crate::application::ports::RepositoryError;

/// Creates the tables and rewrites legacy recommendation payloads. Run once
/// at startup, before the repositories are handed out.
#[instrument(skip(pool))]
pub async fn migrate(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS episodes (
            unique_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            pub_date TEXT NOT NULL,
            link TEXT NOT NULL,
            audio_url TEXT,
            feed_url TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            image TEXT,
            recommendations TEXT,
            scanned_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_episodes_feed_url ON episodes(feed_url)")
        .execute(pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            subject TEXT PRIMARY KEY,
            full_name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            recent_feeds TEXT NOT NULL DEFAULT '[]',
            usage_date TEXT NOT NULL DEFAULT '1970-01-01',
            usage_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    migrate_legacy_payloads(pool).await?;

    info!("Schema migration complete");
    Ok(())
}

/// Earlier payload revisions used a `movies` key where the canonical schema
/// has `media`. Rewrite those rows once here instead of special-casing every
/// read.
async fn migrate_legacy_payloads(pool: &SqlitePool) -> Result<(), RepositoryError> {
    let rows = sqlx::query(
        r#"
        SELECT unique_id, recommendations
        FROM episodes
        WHERE recommendations LIKE '%"movies"%'
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    let mut rewritten = 0usize;
    for row in rows {
        let unique_id: String = row
            .try_get("unique_id")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        let raw: String = row
            .try_get("recommendations")
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let Ok(mut value) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        let Some(object) = value.as_object_mut() else {
            continue;
        };
        let Some(movies) = object.remove("movies") else {
            continue;
        };
        if !object.contains_key("media") {
            object.insert("media".to_string(), movies);
        }

        let updated = value.to_string();
        sqlx::query("UPDATE episodes SET recommendations = ?1 WHERE unique_id = ?2")
            .bind(updated)
            .bind(&unique_id)
            .execute(pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        rewritten += 1;
    }

    if rewritten > 0 {
        info!(rewritten, "Rewrote legacy recommendation payloads");
    }
    Ok(())
}
