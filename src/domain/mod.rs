mod episode;
mod recommendations;
mod transcription;
mod user;

pub use episode::Episode;
pub use recommendations::{RecommendedItem, Recommendations};
pub use transcription::{TranscriptTier, TranscriptionJobId, TranscriptionJobState};
pub use user::{normalize_recent_feeds, RecentFeed, UsageCounter, User};
