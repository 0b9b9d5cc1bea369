use async_trait::async_trait;

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends a single-turn prompt to the completion provider and returns the
    /// raw reply text.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
