use chrono::{DateTime, Utc};

use super::Recommendations;

/// A single podcast episode as stored and served by the scanner.
///
/// `unique_id` is the stable identity: the feed entry's guid when present,
/// otherwise a deterministic composite of link and publish date, otherwise a
/// freshly generated token.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub unique_id: String,
    pub title: String,
    pub pub_date: DateTime<Utc>,
    pub link: String,
    pub audio_url: Option<String>,
    pub feed_url: String,
    pub description: String,
    pub image: Option<String>,
    pub recommendations: Option<Recommendations>,
    pub scanned_at: DateTime<Utc>,
}

impl Episode {
    pub fn new(
        unique_id: String,
        title: String,
        pub_date: DateTime<Utc>,
        link: String,
        audio_url: Option<String>,
        feed_url: String,
    ) -> Self {
        Self {
            unique_id,
            title,
            pub_date,
            link,
            audio_url,
            feed_url,
            description: String::new(),
            image: None,
            recommendations: None,
            scanned_at: Utc::now(),
        }
    }

    pub fn has_recommendations(&self) -> bool {
        self.recommendations.is_some()
    }
}
