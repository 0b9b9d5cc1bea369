use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::application::ports::{EpisodeRepository, RepositoryError};
use crate::domain::{Episode, Recommendations};

pub struct SqliteEpisodeRepository {
    pool: SqlitePool,
}

impl SqliteEpisodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_episode(row: &SqliteRow) -> Result<Episode, RepositoryError> {
    let query_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let pub_date: String = row.try_get("pub_date").map_err(query_err)?;
    let scanned_at: String = row.try_get("scanned_at").map_err(query_err)?;
    let recommendations: Option<String> = row.try_get("recommendations").map_err(query_err)?;

    let recommendations = recommendations
        .map(|raw| {
            serde_json::from_str::<Recommendations>(&raw)
                .map_err(|e| RepositoryError::QueryFailed(format!("payload column: {}", e)))
        })
        .transpose()?;

    Ok(Episode {
        unique_id: row.try_get("unique_id").map_err(query_err)?,
        title: row.try_get("title").map_err(query_err)?,
        pub_date: parse_timestamp(&pub_date)?,
        link: row.try_get("link").map_err(query_err)?,
        audio_url: row.try_get("audio_url").map_err(query_err)?,
        feed_url: row.try_get("feed_url").map_err(query_err)?,
        description: row.try_get("description").map_err(query_err)?,
        image: row.try_get("image").map_err(query_err)?,
        recommendations,
        scanned_at: parse_timestamp(&scanned_at)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::QueryFailed(format!("timestamp column: {}", e)))
}

#[async_trait]
impl EpisodeRepository for SqliteEpisodeRepository {
    #[instrument(skip(self, episode), fields(unique_id = %episode.unique_id))]
    async fn upsert(&self, episode: &Episode) -> Result<Episode, RepositoryError> {
        // ON CONFLICT resolves a uniqueness violation as an update of the
        // mutable metadata; the stored recommendations and scanned_at are
        // deliberately not listed so they survive re-ingestion.
        sqlx::query(
            r#"
            INSERT INTO episodes
                (unique_id, title, pub_date, link, audio_url, feed_url, description, image, scanned_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(unique_id) DO UPDATE SET
                title = excluded.title,
                pub_date = excluded.pub_date,
                link = excluded.link,
                audio_url = excluded.audio_url,
                feed_url = excluded.feed_url,
                description = excluded.description,
                image = excluded.image
            "#,
        )
        .bind(&episode.unique_id)
        .bind(&episode.title)
        .bind(episode.pub_date.to_rfc3339())
        .bind(&episode.link)
        .bind(&episode.audio_url)
        .bind(&episode.feed_url)
        .bind(&episode.description)
        .bind(&episode.image)
        .bind(episode.scanned_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        self.find_by_unique_id(&episode.unique_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(episode.unique_id.clone()))
    }

    #[instrument(skip(self))]
    async fn find_by_unique_id(
        &self,
        unique_id: &str,
    ) -> Result<Option<Episode>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT unique_id, title, pub_date, link, audio_url, feed_url,
                   description, image, recommendations, scanned_at
            FROM episodes
            WHERE unique_id = ?1
            "#,
        )
        .bind(unique_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_episode).transpose()
    }

    #[instrument(skip(self, recommendations))]
    async fn set_recommendations(
        &self,
        unique_id: &str,
        recommendations: &Recommendations,
    ) -> Result<(), RepositoryError> {
        let payload = serde_json::to_string(recommendations)
            .map_err(|e| RepositoryError::QueryFailed(format!("payload encode: {}", e)))?;

        let result = sqlx::query("UPDATE episodes SET recommendations = ?1 WHERE unique_id = ?2")
            .bind(payload)
            .bind(unique_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(unique_id.to_string()));
        }
        Ok(())
    }
}
