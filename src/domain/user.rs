use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A scanner user. Identity is the subject string handed to us by the
/// external auth provider; this service never mints its own user ids.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub subject: String,
    pub full_name: String,
    pub email: String,
    pub recent_feeds: Vec<RecentFeed>,
    pub usage: UsageCounter,
}

/// Summary of a recently viewed podcast feed, most-recent-first. Serialized
/// in camelCase both in the API and in the storage column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFeed {
    pub feed_url: String,
    #[serde(default)]
    pub collection_name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

/// Per-user daily recommendation quota state. `date` is the last local day
/// on which `count` was incremented; the count is stale and must be treated
/// as zero whenever the current day is later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCounter {
    pub date: NaiveDate,
    pub count: u32,
}

/// Deduplicates by feed URL (keeping the first, i.e. most recent, occurrence)
/// and truncates to `cap` entries.
pub fn normalize_recent_feeds(feeds: Vec<RecentFeed>, cap: usize) -> Vec<RecentFeed> {
    let mut seen = std::collections::HashSet::new();
    let mut normalized: Vec<RecentFeed> = feeds
        .into_iter()
        .filter(|f| seen.insert(f.feed_url.clone()))
        .collect();
    normalized.truncate(cap);
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(url: &str) -> RecentFeed {
        RecentFeed {
            feed_url: url.to_string(),
            collection_name: String::new(),
            artist_name: String::new(),
            artwork_url: None,
        }
    }

    #[test]
    fn duplicate_feed_urls_keep_the_most_recent_entry() {
        let result = normalize_recent_feeds(vec![feed("a"), feed("b"), feed("a")], 10);
        let urls: Vec<&str> = result.iter().map(|f| f.feed_url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b"]);
    }

    #[test]
    fn list_is_truncated_to_the_cap() {
        let feeds = (0..15).map(|i| feed(&format!("feed-{i}"))).collect();
        let result = normalize_recent_feeds(feeds, 10);
        assert_eq!(result.len(), 10);
        assert_eq!(result[0].feed_url, "feed-0");
    }
}
