use std::sync::Arc;

use crate::application::ports::{EpisodeRepository, UserRepository};
use crate::application::services::{FeedIngestionService, RecommendationService};
use crate::presentation::config::Settings;

pub struct AppState {
    pub feed_ingestion: Arc<FeedIngestionService>,
    pub episodes: Arc<dyn EpisodeRepository>,
    pub users: Arc<dyn UserRepository>,
    pub recommendations: Arc<RecommendationService>,
    pub settings: Settings,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            feed_ingestion: Arc::clone(&self.feed_ingestion),
            episodes: Arc::clone(&self.episodes),
            users: Arc::clone(&self.users),
            recommendations: Arc::clone(&self.recommendations),
            settings: self.settings.clone(),
        }
    }
}
