use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::ports::{FeedEntry, FeedSource, FeedSourceError};
use crate::domain::Episode;

const UNTITLED_EPISODE: &str = "Untitled Episode";

/// Turns a podcast feed into normalized `Episode` records. Re-fetching the
/// same unchanged feed reproduces the same identifiers, so ingestion is safe
/// to repeat.
pub struct FeedIngestionService {
    feed_source: Arc<dyn FeedSource>,
}

impl FeedIngestionService {
    pub fn new(feed_source: Arc<dyn FeedSource>) -> Self {
        Self { feed_source }
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, feed_url: &str) -> Result<Vec<Episode>, FeedIngestionError> {
        let entries = self.feed_source.fetch(feed_url).await?;

        let episodes = entries
            .into_iter()
            .map(|entry| normalize_entry(entry, feed_url))
            .collect::<Vec<_>>();

        tracing::debug!(count = episodes.len(), feed_url, "Feed ingested");
        Ok(episodes)
    }
}

/// Identifier fallback chain: guid, then a composite of link and publish
/// date, then a generated token. The composite keeps re-ingestion stable for
/// feeds that omit guids but publish proper links.
fn normalize_entry(entry: FeedEntry, feed_url: &str) -> Episode {
    let unique_id = entry
        .guid
        .clone()
        .filter(|g| !g.is_empty())
        .or_else(|| match (&entry.link, &entry.published) {
            (Some(link), Some(published)) => {
                Some(format!("{}|{}", link, published.timestamp()))
            }
            _ => None,
        })
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let title = entry
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED_EPISODE.to_string());

    let mut episode = Episode::new(
        unique_id,
        title,
        entry.published.unwrap_or_else(Utc::now),
        entry.link.unwrap_or_default(),
        entry.audio_url,
        feed_url.to_string(),
    );
    episode.description = entry.description.unwrap_or_default();
    episode.image = entry.image;
    episode
}

#[derive(Debug, thiserror::Error)]
pub enum FeedIngestionError {
    #[error("feed fetch: {0}")]
    Fetch(#[from] FeedSourceError),
}
