use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use podscan::application::services::{
    FeedIngestionService, RecommendationExtractor, RecommendationService, TranscriptionService,
    UsageLimiter,
};
use podscan::infrastructure::feeds::RssFeedFetcher;
use podscan::infrastructure::llm::ChatCompletionClient;
use podscan::infrastructure::observability::{init_tracing, TracingConfig};
use podscan::infrastructure::persistence::{
    create_pool, migrate, SqliteEpisodeRepository, SqliteUserRepository,
};
use podscan::infrastructure::transcription::SpeechApiClient;
use podscan::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("loading configuration")?;

    init_tracing(TracingConfig::default(), settings.server.port);

    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .context("connecting to database")?;
    migrate(&pool).await.context("running schema migration")?;

    let episodes = Arc::new(SqliteEpisodeRepository::new(pool.clone()));
    let users = Arc::new(SqliteUserRepository::new(pool));

    let feed_ingestion = Arc::new(FeedIngestionService::new(Arc::new(RssFeedFetcher::new())));

    let transcription = Arc::new(TranscriptionService::new(
        Arc::new(SpeechApiClient::new(
            &settings.transcription.base_url,
            &settings.transcription.api_key,
        )),
        settings.transcription.poll_interval,
        settings.transcription.poll_deadline,
        settings.transcription.cache_ttl,
    ));

    let extractor = Arc::new(RecommendationExtractor::new(
        Arc::new(ChatCompletionClient::new(
            &settings.completion.base_url,
            &settings.completion.api_key,
            &settings.completion.model,
        )),
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
        feed_ingestion,
        episodes,
        users,
        recommendations,
        settings: settings.clone(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("parsing listen address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
