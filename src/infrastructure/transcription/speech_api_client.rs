use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{TranscriptionProvider, TranscriptionProviderError};
use crate::domain::{TranscriptTier, TranscriptionJobId, TranscriptionJobState};

/// HTTP adapter for the speech-to-text provider's async job API: one POST to
/// submit, then GETs against the status endpoint until the job resolves.
pub struct SpeechApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SpeechApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    audio_url: &'a str,
    speech_model: &'static str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
    text: Option<String>,
    error: Option<String>,
}

fn speech_model(tier: TranscriptTier) -> &'static str {
    match tier {
        TranscriptTier::Fast => "nano",
        TranscriptTier::Accurate => "best",
    }
}

#[async_trait]
impl TranscriptionProvider for SpeechApiClient {
    #[tracing::instrument(skip(self))]
    async fn submit(
        &self,
        audio_url: &str,
        tier: TranscriptTier,
    ) -> Result<TranscriptionJobId, TranscriptionProviderError> {
        let url = format!("{}/v2/transcript", self.base_url);
        let body = SubmitRequest {
            audio_url,
            speech_model: speech_model(tier),
        };

        let response = self
            .client
            .post(&url)
            .header("authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptionProviderError::ApiRequestFailed(format!("submit: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionProviderError::ApiRequestFailed(format!(
                "submit status {}: {}",
                status, body
            )));
        }

        let submitted: SubmitResponse = response.json().await.map_err(|e| {
            TranscriptionProviderError::InvalidResponse(format!("submit body: {}", e))
        })?;

        Ok(TranscriptionJobId::new(submitted.id))
    }

    #[tracing::instrument(skip(self))]
    async fn poll(
        &self,
        job_id: &TranscriptionJobId,
    ) -> Result<TranscriptionJobState, TranscriptionProviderError> {
        let url = format!("{}/v2/transcript/{}", self.base_url, job_id);

        let response = self
            .client
            .get(&url)
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| TranscriptionProviderError::ApiRequestFailed(format!("poll: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionProviderError::ApiRequestFailed(format!(
                "poll status {}: {}",
                status, body
            )));
        }

        let status: StatusResponse = response.json().await.map_err(|e| {
            TranscriptionProviderError::InvalidResponse(format!("poll body: {}", e))
        })?;

        match status.status.as_str() {
            "queued" => Ok(TranscriptionJobState::Queued),
            "processing" => Ok(TranscriptionJobState::Processing),
            "completed" => Ok(TranscriptionJobState::Completed {
                text: status.text.unwrap_or_default(),
            }),
            "error" => Ok(TranscriptionJobState::Failed {
                message: status
                    .error
                    .unwrap_or_else(|| "unspecified provider error".to_string()),
            }),
            other => Err(TranscriptionProviderError::InvalidResponse(format!(
                "unknown job status: {}",
                other
            ))),
        }
    }
}
