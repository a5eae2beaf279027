//! Admin notification feed and its retention policy.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{NotificationsRepo, RepoError};
use crate::domain::entities::NotificationRecord;
use crate::domain::error::DomainError;

/// Read notifications older than this are purged by the nightly job.
pub const READ_RETENTION: Duration = Duration::days(30);

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationsRepo>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationsRepo>) -> Self {
        Self { notifications }
    }

    pub async fn list(&self) -> Result<Vec<NotificationRecord>, AppError> {
        Ok(self.notifications.list_notifications().await?)
    }

    /// Marks one notification read, then returns the refreshed full list so
    /// the admin panel can swap its state in one round trip.
    pub async fn mark_read(&self, id: Uuid) -> Result<Vec<NotificationRecord>, AppError> {
        let now = OffsetDateTime::now_utc();
        self.notifications
            .mark_notification_read(id, now)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => AppError::from(DomainError::not_found("Notification")),
                other => AppError::from(other),
            })?;
        self.list().await
    }

    /// Deletes read notifications older than [`READ_RETENTION`], returning
    /// how many went away.
    pub async fn purge_read(&self) -> Result<u64, AppError> {
        let cutoff = OffsetDateTime::now_utc() - READ_RETENTION;
        Ok(self
            .notifications
            .delete_read_notifications_before(cutoff)
            .await?)
    }
}
