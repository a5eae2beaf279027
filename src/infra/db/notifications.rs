use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{NewNotificationParams, NotificationsRepo, RepoError};
use crate::domain::entities::NotificationRecord;
use crate::domain::types::NotificationStatus;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    message: String,
    status: NotificationStatus,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<NotificationRow> for NotificationRecord {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl NotificationsRepo for PostgresRepositories {
    async fn create_notification(
        &self,
        params: NewNotificationParams,
    ) -> Result<NotificationRecord, RepoError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            "INSERT INTO notifications (id, user_id, title, message, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING id, user_id, title, message, status, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(params.user_id)
        .bind(params.title)
        .bind(params.message)
        .bind(NotificationStatus::Unread)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_notifications(&self) -> Result<Vec<NotificationRecord>, RepoError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, user_id, title, message, status, created_at, updated_at \
             FROM notifications ORDER BY created_at DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(NotificationRecord::from).collect())
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        read_at: OffsetDateTime,
    ) -> Result<NotificationRecord, RepoError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            "UPDATE notifications SET status = $2, updated_at = $3 WHERE id = $1 \
             RETURNING id, user_id, title, message, status, created_at, updated_at",
        )
        .bind(id)
        .bind(NotificationStatus::Read)
        .bind(read_at)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(NotificationRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_read_notifications_before(
        &self,
        cutoff: OffsetDateTime,
    ) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM notifications WHERE status = $1 AND created_at < $2")
            .bind(NotificationStatus::Read)
            .bind(cutoff)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
