use async_trait::async_trait;

use crate::domain::{TranscriptTier, TranscriptionJobId, TranscriptionJobState};

#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Submits a transcription job for a remotely hosted audio file and
    /// returns the provider's job id.
    async fn submit(
        &self,
        audio_url: &str,
        tier: TranscriptTier,
    ) -> Result<TranscriptionJobId, TranscriptionProviderError>;

    /// Fetches the current remote state of a previously submitted job.
    async fn poll(
        &self,
        job_id: &TranscriptionJobId,
    ) -> Result<TranscriptionJobState, TranscriptionProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionProviderError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
