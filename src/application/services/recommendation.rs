use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::{EpisodeRepository, RepositoryError};
use crate::domain::Recommendations;

use super::{
    ExtractionError, RecommendationExtractor, TranscriptionError, TranscriptionService,
    UsageError, UsageLimiter,
};

/// Top-level recommendation workflow: cached payload, else quota check,
/// transcription, extraction, persist.
///
/// Requests for the same episode are serialized through a per-episode lock;
/// the second waiter re-checks the store after acquiring it and returns the
/// first request's persisted result instead of re-running the pipeline.
pub struct RecommendationService {
    episodes: Arc<dyn EpisodeRepository>,
    limiter: Arc<UsageLimiter>,
    transcription: Arc<TranscriptionService>,
    extractor: Arc<RecommendationExtractor>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecommendationService {
    pub fn new(
        episodes: Arc<dyn EpisodeRepository>,
        limiter: Arc<UsageLimiter>,
        transcription: Arc<TranscriptionService>,
        extractor: Arc<RecommendationExtractor>,
    ) -> Self {
        Self {
            episodes,
            limiter,
            transcription,
            extractor,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn recommendations_for(
        &self,
        subject: &str,
        unique_id: &str,
    ) -> Result<Recommendations, RecommendationError> {
        // Cache hits never consume quota and never touch the providers.
        if let Some(cached) = self.cached_payload(unique_id).await? {
            tracing::debug!(unique_id, "Recommendation cache hit");
            return Ok(cached);
        }

        let lock = self.episode_lock(unique_id).await;
        let guard = lock.lock().await;

        let result = self.run_pipeline(subject, unique_id).await;

        drop(guard);
        self.release_episode_lock(unique_id, lock).await;

        result
    }

    async fn run_pipeline(
        &self,
        subject: &str,
        unique_id: &str,
    ) -> Result<Recommendations, RecommendationError> {
        // A concurrent request may have persisted while we waited on the lock.
        if let Some(cached) = self.cached_payload(unique_id).await? {
            tracing::debug!(unique_id, "Recommendation persisted by concurrent request");
            return Ok(cached);
        }

        let episode = self
            .episodes
            .find_by_unique_id(unique_id)
            .await?
            .ok_or(RecommendationError::NotFound)?;

        self.limiter.check_and_consume(subject).await?;

        let audio_url = episode
            .audio_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(RecommendationError::NoAudio)?;

        let transcript = self.transcription.transcribe(audio_url).await?;
        let payload = self.extractor.extract(&transcript, &episode.title).await?;

        // The payload becomes durable, and visible to later cache checks,
        // only here. An extraction failure above leaves the episode without
        // a payload so a later request retries from scratch.
        self.episodes
            .set_recommendations(unique_id, &payload)
            .await?;

        tracing::info!(unique_id, "Recommendations persisted");
        Ok(payload)
    }

    async fn cached_payload(
        &self,
        unique_id: &str,
    ) -> Result<Option<Recommendations>, RecommendationError> {
        let episode = self.episodes.find_by_unique_id(unique_id).await?;
        Ok(episode.and_then(|e| e.recommendations))
    }

    async fn episode_lock(&self, unique_id: &str) -> Arc<Mutex<()>> {
        let mut map = self.in_flight.lock().await;
        map.entry(unique_id.to_string()).or_default().clone()
    }

    async fn release_episode_lock(&self, unique_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut map = self.in_flight.lock().await;
        if let Some(entry) = map.get(unique_id) {
            // Only the map still holds the lock: no other request is waiting.
            if Arc::strong_count(entry) == 1 {
                map.remove(unique_id);
            }
        }
    }
}

/// Stable user-visible error kinds; component failures are mapped into this
/// set and never leak raw upstream bodies.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("episode not found")]
    NotFound,
    #[error("episode has no audio available")]
    NoAudio,
    #[error("daily recommendation quota exceeded")]
    QuotaExceeded,
    #[error("transcription timed out, try again later")]
    TimedOut,
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("invalid recommendation payload: {0}")]
    Validation(String),
    #[error("store failure: {0}")]
    Store(#[from] RepositoryError),
}

impl From<UsageError> for RecommendationError {
    fn from(err: UsageError) -> Self {
        match err {
            UsageError::QuotaExceeded => RecommendationError::QuotaExceeded,
            UsageError::Repository(e) => RecommendationError::Store(e),
        }
    }
}

impl From<TranscriptionError> for RecommendationError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::TimedOut => RecommendationError::TimedOut,
            other => RecommendationError::Upstream(other.to_string()),
        }
    }
}

impl From<ExtractionError> for RecommendationError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::MalformedReply(msg) => RecommendationError::Validation(msg),
            ExtractionError::EmptyCompletion => {
                RecommendationError::Validation("completion reply was empty".to_string())
            }
            ExtractionError::Completion(e) => RecommendationError::Upstream(e.to_string()),
        }
    }
}
