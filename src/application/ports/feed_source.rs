use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A raw syndication entry before normalization. Every field is optional
/// here; `FeedIngestionService` applies the sentinel and fallback rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub guid: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub audio_url: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches and parses the feed as currently published, in document order.
    /// Failure is terminal for the whole fetch; there are no partial results.
    async fn fetch(&self, feed_url: &str) -> Result<Vec<FeedEntry>, FeedSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FeedSourceError {
    #[error("feed unreachable: {0}")]
    Unreachable(String),
    #[error("malformed feed: {0}")]
    Malformed(String),
}
