mod completion_client;
mod episode_repository;
mod feed_source;
mod repository_error;
mod transcription_provider;
mod user_repository;

pub use completion_client::{CompletionClient, CompletionError};
pub use episode_repository::EpisodeRepository;
pub use feed_source::{FeedEntry, FeedSource, FeedSourceError};
pub use repository_error::RepositoryError;
pub use transcription_provider::{TranscriptionProvider, TranscriptionProviderError};
pub use user_repository::UserRepository;
