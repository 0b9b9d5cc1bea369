use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{RecentFeed, User};

use super::RepositoryError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates or updates the profile fields for the given subject.
    async fn upsert_profile(
        &self,
        subject: &str,
        full_name: &str,
        email: &str,
    ) -> Result<User, RepositoryError>;

    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, RepositoryError>;

    /// Creates an empty record for the subject if none exists. No-op otherwise.
    async fn ensure_exists(&self, subject: &str) -> Result<(), RepositoryError>;

    /// Replaces the recently-viewed feed list verbatim; callers are expected
    /// to normalize (dedup, cap) first.
    async fn set_recent_feeds(
        &self,
        subject: &str,
        feeds: &[RecentFeed],
    ) -> Result<(), RepositoryError>;

    /// Zeroes the usage counter and stamps `today` when the stored usage date
    /// is from an earlier day. Idempotent within a day.
    async fn reset_usage_if_new_day(
        &self,
        subject: &str,
        today: NaiveDate,
    ) -> Result<(), RepositoryError>;

    /// Atomically increments the usage counter only while it is below
    /// `ceiling`. Returns whether the increment happened. This is the single
    /// conditional write the quota check relies on; there is no separate
    /// read-then-write step to race against.
    async fn try_increment_usage(
        &self,
        subject: &str,
        ceiling: u32,
    ) -> Result<bool, RepositoryError>;
}
