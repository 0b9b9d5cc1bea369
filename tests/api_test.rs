use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use tower::ServiceExt;

use podscan::application::ports::{
    CompletionClient, CompletionError, FeedEntry, FeedSource, FeedSourceError,
    TranscriptionProvider, TranscriptionProviderError,
};
use podscan::application::services::{
    FeedIngestionService, RecommendationExtractor, RecommendationService, TranscriptionService,
    UsageLimiter,
};
use podscan::domain::{TranscriptTier, TranscriptionJobId, TranscriptionJobState};
use podscan::infrastructure::persistence::{
    create_pool, migrate, SqliteEpisodeRepository, SqliteUserRepository,
};
use podscan::presentation::config::{
    CompletionSettings, DatabaseSettings, QuotaSettings, ServerSettings, Settings,
    TranscriptionSettings,
};
use podscan::presentation::{create_router, AppState};

const VALID_REPLY: &str = r#"{"summary":"s","books":[],"media":[]}"#;

struct StaticFeedSource;

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self, _feed_url: &str) -> Result<Vec<FeedEntry>, FeedSourceError> {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Ok(vec![
            FeedEntry {
                guid: Some("guid-1".to_string()),
                title: Some("One".to_string()),
                link: Some("https://example.com/1".to_string()),
                published: Some(published),
                audio_url: Some("https://example.com/1.mp3".to_string()),
                description: None,
                image: None,
            },
            FeedEntry {
                guid: Some("guid-2".to_string()),
                title: None,
                link: Some("https://example.com/2".to_string()),
                published: Some(published),
                audio_url: None,
                description: None,
                image: None,
            },
        ])
    }
}

struct InstantProvider;

#[async_trait]
impl TranscriptionProvider for InstantProvider {
    async fn submit(
        &self,
        _audio_url: &str,
        _tier: TranscriptTier,
    ) -> Result<TranscriptionJobId, TranscriptionProviderError> {
        Ok(TranscriptionJobId::new("job-1"))
    }

    async fn poll(
        &self,
        _job_id: &TranscriptionJobId,
    ) -> Result<TranscriptionJobState, TranscriptionProviderError> {
        Ok(TranscriptionJobState::Completed {
            text: "hello world".to_string(),
        })
    }
}

struct StaticCompletionClient;

#[async_trait]
impl CompletionClient for StaticCompletionClient {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, CompletionError> {
        Ok(VALID_REPLY.to_string())
    }
}

fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        transcription: TranscriptionSettings {
            base_url: "http://unused".to_string(),
            api_key: "test".to_string(),
            poll_interval: Duration::from_millis(1),
            poll_deadline: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
        },
        completion: CompletionSettings {
            base_url: "http://unused".to_string(),
            api_key: "test".to_string(),
            model: "test-model".to_string(),
            max_tokens: 1024,
            transcript_max_chars: 16_000,
            cache_ttl: Duration::from_secs(60),
        },
        quota: QuotaSettings {
            daily_ceiling: 5,
            owner_subject: None,
        },
        recent_feeds_cap: 3,
    }
}

async fn test_router() -> Router {
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    migrate(&pool).await.unwrap();

    let episodes = Arc::new(SqliteEpisodeRepository::new(pool.clone()));
    let users = Arc::new(SqliteUserRepository::new(pool));
    let settings = test_settings();

    let transcription = Arc::new(TranscriptionService::new(
        Arc::new(InstantProvider),
        settings.transcription.poll_interval,
        settings.transcription.poll_deadline,
        settings.transcription.cache_ttl,
    ));
    let extractor = Arc::new(RecommendationExtractor::new(
        Arc::new(StaticCompletionClient),
        settings.completion.transcript_max_chars,
        settings.completion.max_tokens,
        settings.completion.cache_ttl,
    ));
    let limiter = Arc::new(UsageLimiter::new(
        users.clone(),
        settings.quota.daily_ceiling,
        settings.quota.owner_subject.clone(),
    ));
    let recommendations = Arc::new(RecommendationService::new(
        episodes.clone(),
        limiter,
        transcription,
        extractor,
    ));

    let state = AppState {
        feed_ingestion: Arc::new(FeedIngestionService::new(Arc::new(StaticFeedSource))),
        episodes,
        users,
        recommendations,
        settings,
    };

    create_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-auth-subject", "alice")
        .body(Body::empty())
        .unwrap()
}

fn authed_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-auth-subject", "alice")
        .header("x-auth-name", "Alice")
        .header("x-auth-email", "alice@example.com")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn given_running_service_when_checking_health_then_healthy() {
    let router = test_router().await;

    let response = router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn given_missing_feed_url_when_fetching_raw_episodes_then_bad_request() {
    let router = test_router().await;

    let response = router.oneshot(get("/api/podcasts/raw")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_feed_url_when_fetching_raw_episodes_then_normalized_list_is_returned() {
    let router = test_router().await;

    let response = router
        .oneshot(get("/api/podcasts/raw?feedUrl=https://example.com/feed.xml"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["uniqueId"], "guid-1");
    assert_eq!(body[1]["title"], "Untitled Episode");
}

#[tokio::test]
async fn given_no_auth_subject_when_saving_episode_then_unauthorized() {
    let router = test_router().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/podcasts/single")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({"uniqueId": "ep-1"}).to_string(),
        ))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error_kind"], "unauthenticated");
}

#[tokio::test]
async fn given_missing_unique_id_when_saving_episode_then_bad_request() {
    let router = test_router().await;

    let response = router
        .oneshot(authed_post(
            "/api/podcasts/single",
            serde_json::json!({"title": "No Id"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_episode_body_when_saving_then_stored_record_is_returned() {
    let router = test_router().await;

    let response = router
        .oneshot(authed_post(
            "/api/podcasts/single",
            serde_json::json!({
                "uniqueId": "ep-1",
                "title": "Saved Episode",
                "audioUrl": "https://example.com/ep.mp3",
                "feedUrl": "https://example.com/feed.xml"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["uniqueId"], "ep-1");
    assert_eq!(body["title"], "Saved Episode");
    assert!(body["recommendations"].is_null());
}

#[tokio::test]
async fn given_unknown_episode_when_requesting_recommendations_then_not_found_kind() {
    let router = test_router().await;

    let response = router
        .oneshot(authed_get("/api/episodes/missing/recommendations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error_kind"], "not-found");
}

#[tokio::test]
async fn given_episode_without_audio_when_requesting_recommendations_then_no_audio_kind() {
    let router = test_router().await;
    router
        .clone()
        .oneshot(authed_post(
            "/api/podcasts/single",
            serde_json::json!({"uniqueId": "silent", "title": "Silent"}),
        ))
        .await
        .unwrap();

    let response = router
        .oneshot(authed_get("/api/episodes/silent/recommendations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error_kind"], "no-audio");
}

#[tokio::test]
async fn given_saved_episode_when_requesting_recommendations_then_pipeline_result_is_returned() {
    let router = test_router().await;
    router
        .clone()
        .oneshot(authed_post(
            "/api/podcasts/single",
            serde_json::json!({
                "uniqueId": "ep-1",
                "title": "Episode One",
                "audioUrl": "https://example.com/ep.mp3",
                "feedUrl": "https://example.com/feed.xml"
            }),
        ))
        .await
        .unwrap();

    let response = router
        .oneshot(authed_get("/api/episodes/ep-1/recommendations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["recommendations"]["summary"], "s");
}

#[tokio::test]
async fn given_profile_fields_when_saving_user_then_created() {
    let router = test_router().await;

    let response = router
        .oneshot(authed_post(
            "/api/save-user",
            serde_json::json!({"fullName": "Alice", "email": "Alice@Example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["subject"], "alice");
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn given_duplicate_feeds_when_saving_recent_feeds_then_list_is_deduped_and_capped() {
    let router = test_router().await;

    let feeds = serde_json::json!({
        "recentFeeds": [
            {"feedUrl": "https://a.example/feed"},
            {"feedUrl": "https://b.example/feed"},
            {"feedUrl": "https://a.example/feed"},
            {"feedUrl": "https://c.example/feed"},
            {"feedUrl": "https://d.example/feed"}
        ]
    });
    let response = router
        .clone()
        .oneshot(authed_post("/api/user/recent-feeds", feeds))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    // Cap is 3 in the test settings; the duplicate of "a" is dropped first.
    let urls: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["feedUrl"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://a.example/feed",
            "https://b.example/feed",
            "https://c.example/feed"
        ]
    );

    let fetched = router
        .oneshot(authed_get("/api/user/recent-feeds"))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched_body = json_body(fetched).await;
    assert_eq!(fetched_body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn given_unknown_user_when_fetching_recent_feeds_then_not_found() {
    let router = test_router().await;

    let response = router
        .oneshot(authed_get("/api/user/recent-feeds"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
