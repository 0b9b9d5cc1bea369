use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::application::ports::{TranscriptionProvider, TranscriptionProviderError};
use crate::domain::{TranscriptTier, TranscriptionJobState};

/// Submits a transcription job and polls it to completion.
///
/// Polling is bounded by `poll_deadline`; hitting the deadline surfaces
/// `TranscriptionError::TimedOut` rather than looping until the remote job
/// resolves. A job that fails on the fast tier is retried once on the
/// accurate tier before the failure is surfaced.
pub struct TranscriptionService {
    provider: Arc<dyn TranscriptionProvider>,
    poll_interval: Duration,
    poll_deadline: Duration,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CachedTranscript>>,
}

struct CachedTranscript {
    stored_at: Instant,
    text: String,
}

impl TranscriptionService {
    pub fn new(
        provider: Arc<dyn TranscriptionProvider>,
        poll_interval: Duration,
        poll_deadline: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            poll_interval,
            poll_deadline,
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn transcribe(&self, audio_url: &str) -> Result<String, TranscriptionError> {
        if let Some(text) = self.cached(audio_url) {
            tracing::debug!(audio_url, "Transcript cache hit");
            return Ok(text);
        }

        let text = match self.run_job(audio_url, TranscriptTier::Fast).await {
            Ok(text) => text,
            Err(TranscriptionError::JobFailed(message)) => {
                tracing::warn!(audio_url, %message, "Fast-tier job failed, retrying on accurate tier");
                self.run_job(audio_url, TranscriptTier::Accurate).await?
            }
            Err(other) => return Err(other),
        };

        self.store(audio_url, &text);
        Ok(text)
    }

    async fn run_job(
        &self,
        audio_url: &str,
        tier: TranscriptTier,
    ) -> Result<String, TranscriptionError> {
        let job_id = self.provider.submit(audio_url, tier).await?;
        tracing::info!(%job_id, %tier, "Transcription job submitted");

        let deadline = Instant::now() + self.poll_deadline;
        loop {
            match self.provider.poll(&job_id).await? {
                TranscriptionJobState::Completed { text } => {
                    tracing::info!(%job_id, chars = text.len(), "Transcription completed");
                    return Ok(text);
                }
                TranscriptionJobState::Failed { message } => {
                    return Err(TranscriptionError::JobFailed(message));
                }
                TranscriptionJobState::Queued | TranscriptionJobState::Processing => {}
            }

            if Instant::now() + self.poll_interval > deadline {
                tracing::warn!(%job_id, "Transcription poll deadline exceeded");
                return Err(TranscriptionError::TimedOut);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn cached(&self, audio_url: &str) -> Option<String> {
        let mut cache = self.cache.lock().ok()?;
        match cache.get(audio_url) {
            Some(entry) if entry.stored_at.elapsed() < self.cache_ttl => {
                Some(entry.text.clone())
            }
            Some(_) => {
                cache.remove(audio_url);
                None
            }
            None => None,
        }
    }

    fn store(&self, audio_url: &str, text: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                audio_url.to_string(),
                CachedTranscript {
                    stored_at: Instant::now(),
                    text: text.to_string(),
                },
            );
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("provider: {0}")]
    Provider(#[from] TranscriptionProviderError),
    #[error("transcription job failed: {0}")]
    JobFailed(String),
    #[error("transcription timed out, try again later")]
    TimedOut,
}
