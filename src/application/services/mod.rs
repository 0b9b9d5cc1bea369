mod extractor;
mod feed_ingestion;
mod recommendation;
mod transcription;
mod usage_limiter;

pub use extractor::{ExtractionError, RecommendationExtractor};
pub use feed_ingestion::{FeedIngestionError, FeedIngestionService};
pub use recommendation::{RecommendationError, RecommendationService};
pub use transcription::{TranscriptionError, TranscriptionService};
pub use usage_limiter::{UsageError, UsageLimiter};
