use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;

use crate::application::ports::{FeedEntry, FeedSource, FeedSourceError};

/// Fetches podcast RSS/Atom feeds over HTTP and maps entries to raw
/// `FeedEntry` values. Normalization (title sentinel, id fallback) happens
/// in the ingestion service, not here.
pub struct RssFeedFetcher {
    client: reqwest::Client,
}

impl RssFeedFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("podscan/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for RssFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for RssFeedFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, feed_url: &str) -> Result<Vec<FeedEntry>, FeedSourceError> {
        let response = self
            .client
            .get(feed_url)
            .send()
            .await
            .map_err(|e| FeedSourceError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedSourceError::Unreachable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedSourceError::Unreachable(e.to_string()))?;

        let feed =
            parser::parse(&bytes[..]).map_err(|e| FeedSourceError::Malformed(e.to_string()))?;

        let feed_image = feed.logo.as_ref().map(|i| i.uri.clone());

        let entries = feed
            .entries
            .into_iter()
            .map(|entry| {
                let audio_url = entry
                    .media
                    .iter()
                    .flat_map(|m| m.content.iter())
                    .find(|c| {
                        c.url.is_some()
                            && c.content_type
                                .as_ref()
                                .map(|t| t.to_string().starts_with("audio/"))
                                .unwrap_or(true)
                    })
                    .and_then(|c| c.url.as_ref().map(|u| u.to_string()));

                let image = entry
                    .media
                    .iter()
                    .flat_map(|m| m.thumbnails.iter())
                    .next()
                    .map(|t| t.image.uri.clone())
                    .or_else(|| feed_image.clone());

                FeedEntry {
                    guid: (!entry.id.is_empty()).then_some(entry.id),
                    title: entry.title.map(|t| t.content),
                    link: entry.links.first().map(|l| l.href.clone()),
                    published: entry.published.or(entry.updated),
                    audio_url,
                    description: entry.summary.map(|s| s.content),
                    image,
                }
            })
            .collect();

        Ok(entries)
    }
}
