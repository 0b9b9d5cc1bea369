use chrono::{TimeZone, Utc};
use sqlx::SqlitePool;

use podscan::application::ports::{
    EpisodeRepository, RepositoryError, UserRepository,
};
use podscan::domain::{Episode, RecentFeed, RecommendedItem, Recommendations};
use podscan::infrastructure::persistence::{
    create_pool, migrate, SqliteEpisodeRepository, SqliteUserRepository,
};

async fn pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    migrate(&pool).await.unwrap();
    pool
}

fn episode(unique_id: &str) -> Episode {
    let mut episode = Episode::new(
        unique_id.to_string(),
        "Original Title".to_string(),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        "https://example.com/ep".to_string(),
        Some("https://example.com/ep.mp3".to_string()),
        "https://example.com/feed.xml".to_string(),
    );
    episode.description = "about things".to_string();
    episode
}

fn payload(summary: &str) -> Recommendations {
    Recommendations {
        summary: summary.to_string(),
        books: vec![RecommendedItem {
            title: "Dune".to_string(),
            description: "novel".to_string(),
            context: "guest favorite".to_string(),
        }],
        media: vec![],
    }
}

#[tokio::test]
async fn given_new_episode_when_upserting_then_round_trips_through_find() {
    let repo = SqliteEpisodeRepository::new(pool().await);
    let original = episode("ep-1");

    let saved = repo.upsert(&original).await.unwrap();
    let found = repo.find_by_unique_id("ep-1").await.unwrap().unwrap();

    assert_eq!(saved, found);
    assert_eq!(found.title, "Original Title");
    assert_eq!(found.audio_url.as_deref(), Some("https://example.com/ep.mp3"));
    assert!(found.recommendations.is_none());
}

#[tokio::test]
async fn given_existing_episode_when_upserting_again_then_metadata_updates_without_duplicates() {
    let repo = SqliteEpisodeRepository::new(pool().await);
    repo.upsert(&episode("ep-1")).await.unwrap();

    let mut updated = episode("ep-1");
    updated.title = "Renamed".to_string();
    let saved = repo.upsert(&updated).await.unwrap();

    assert_eq!(saved.title, "Renamed");
    let found = repo.find_by_unique_id("ep-1").await.unwrap().unwrap();
    assert_eq!(found.title, "Renamed");
}

#[tokio::test]
async fn given_stored_recommendations_when_reingesting_then_payload_is_preserved() {
    let repo = SqliteEpisodeRepository::new(pool().await);
    repo.upsert(&episode("ep-1")).await.unwrap();
    repo.set_recommendations("ep-1", &payload("summary"))
        .await
        .unwrap();

    let mut updated = episode("ep-1");
    updated.title = "Renamed".to_string();
    repo.upsert(&updated).await.unwrap();

    let found = repo.find_by_unique_id("ep-1").await.unwrap().unwrap();
    assert_eq!(found.title, "Renamed");
    assert_eq!(found.recommendations.unwrap().summary, "summary");
}

#[tokio::test]
async fn given_same_payload_when_setting_recommendations_twice_then_state_is_unchanged() {
    let repo = SqliteEpisodeRepository::new(pool().await);
    repo.upsert(&episode("ep-1")).await.unwrap();

    repo.set_recommendations("ep-1", &payload("same"))
        .await
        .unwrap();
    let after_first = repo.find_by_unique_id("ep-1").await.unwrap().unwrap();

    repo.set_recommendations("ep-1", &payload("same"))
        .await
        .unwrap();
    let after_second = repo.find_by_unique_id("ep-1").await.unwrap().unwrap();

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn given_unknown_episode_when_setting_recommendations_then_not_found() {
    let repo = SqliteEpisodeRepository::new(pool().await);

    let result = repo.set_recommendations("missing", &payload("s")).await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn given_legacy_movies_payload_when_migrating_then_it_is_rewritten_to_media() {
    let pool = pool().await;
    sqlx::query(
        r#"
        INSERT INTO episodes (unique_id, title, pub_date, link, feed_url, recommendations, scanned_at)
        VALUES ('legacy-1', 'Old', '2023-01-01T00:00:00+00:00', 'https://example.com/old',
                'https://example.com/feed.xml',
                '{"summary":"s","books":[],"movies":[{"title":"Heat","description":"film"}]}',
                '2023-01-01T00:00:00+00:00')
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    migrate(&pool).await.unwrap();

    let repo = SqliteEpisodeRepository::new(pool);
    let found = repo.find_by_unique_id("legacy-1").await.unwrap().unwrap();
    let recs = found.recommendations.unwrap();
    assert_eq!(recs.media.len(), 1);
    assert_eq!(recs.media[0].title, "Heat");
    assert_eq!(recs.media[0].context, "");
}

#[tokio::test]
async fn given_profile_upsert_when_repeated_then_fields_update_in_place() {
    let repo = SqliteUserRepository::new(pool().await);

    let created = repo
        .upsert_profile("alice", "Alice", "alice@example.com")
        .await
        .unwrap();
    assert_eq!(created.full_name, "Alice");

    let updated = repo
        .upsert_profile("alice", "Alice B.", "alice@example.com")
        .await
        .unwrap();
    assert_eq!(updated.full_name, "Alice B.");
    assert_eq!(updated.usage.count, 0);
}

#[tokio::test]
async fn given_recent_feeds_when_saving_then_round_trips() {
    let repo = SqliteUserRepository::new(pool().await);
    repo.ensure_exists("alice").await.unwrap();

    let feeds = vec![RecentFeed {
        feed_url: "https://example.com/feed.xml".to_string(),
        collection_name: "Example Show".to_string(),
        artist_name: "Host".to_string(),
        artwork_url: Some("https://example.com/art.png".to_string()),
    }];
    repo.set_recent_feeds("alice", &feeds).await.unwrap();

    let user = repo.find_by_subject("alice").await.unwrap().unwrap();
    assert_eq!(user.recent_feeds, feeds);
}

#[tokio::test]
async fn given_unknown_user_when_saving_recent_feeds_then_not_found() {
    let repo = SqliteUserRepository::new(pool().await);

    let result = repo.set_recent_feeds("missing", &[]).await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}
