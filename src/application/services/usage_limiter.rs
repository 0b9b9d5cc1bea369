use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::application::ports::{RepositoryError, UserRepository};

/// Enforces the per-user daily recommendation quota.
///
/// The counter lives on the user record and is advanced with a single
/// conditional increment, so concurrent requests from the same user cannot
/// slip past the ceiling between a read and a write. One designated owner
/// subject bypasses the check entirely.
pub struct UsageLimiter {
    users: Arc<dyn UserRepository>,
    ceiling: u32,
    owner_subject: Option<String>,
}

impl UsageLimiter {
    pub fn new(users: Arc<dyn UserRepository>, ceiling: u32, owner_subject: Option<String>) -> Self {
        Self {
            users,
            ceiling,
            owner_subject,
        }
    }

    /// Consumes one unit of today's quota, creating the user record lazily.
    pub async fn check_and_consume(&self, subject: &str) -> Result<(), UsageError> {
        self.check_and_consume_on(subject, Local::now().date_naive())
            .await
    }

    /// Same as [`check_and_consume`](Self::check_and_consume) with an
    /// explicit "today", so day-boundary behavior is deterministic in tests.
    pub async fn check_and_consume_on(
        &self,
        subject: &str,
        today: NaiveDate,
    ) -> Result<(), UsageError> {
        if self
            .owner_subject
            .as_deref()
            .is_some_and(|owner| owner == subject)
        {
            tracing::debug!(subject, "Owner subject, quota bypassed");
            return Ok(());
        }

        self.users.ensure_exists(subject).await?;
        self.users.reset_usage_if_new_day(subject, today).await?;

        if self.users.try_increment_usage(subject, self.ceiling).await? {
            Ok(())
        } else {
            tracing::info!(subject, ceiling = self.ceiling, "Daily quota exceeded");
            Err(UsageError::QuotaExceeded)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("daily recommendation quota exceeded")]
    QuotaExceeded,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
