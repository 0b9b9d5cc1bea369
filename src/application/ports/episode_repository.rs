use async_trait::async_trait;

use crate::domain::{Episode, Recommendations};

use super::RepositoryError;

#[async_trait]
pub trait EpisodeRepository: Send + Sync {
    /// Inserts the episode, or updates its mutable metadata when a record
    /// with the same `unique_id` already exists. An existing recommendation
    /// payload is left untouched. Returns the resulting record.
    async fn upsert(&self, episode: &Episode) -> Result<Episode, RepositoryError>;

    async fn find_by_unique_id(&self, unique_id: &str)
        -> Result<Option<Episode>, RepositoryError>;

    /// Replaces the recommendation payload in a single write: a concurrent
    /// reader sees either the old or the new payload, never a partial one.
    async fn set_recommendations(
        &self,
        unique_id: &str,
        recommendations: &Recommendations,
    ) -> Result<(), RepositoryError>;
}
