//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::courses::CourseDocument;
use crate::domain::entities::{NotificationRecord, OrderRecord, SessionRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewNotificationParams {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct NewOrderParams {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub payment: Option<Value>,
}

#[async_trait]
pub trait CoursesRepo: Send + Sync {
    async fn find_course(&self, id: Uuid) -> Result<Option<CourseDocument>, RepoError>;

    /// Lists every course document, newest first.
    async fn list_courses(&self) -> Result<Vec<CourseDocument>, RepoError>;

    async fn create_course(&self, document: &CourseDocument) -> Result<(), RepoError>;

    /// Persists the whole document under its id, replacing the stored copy.
    async fn save_course(&self, document: &CourseDocument) -> Result<(), RepoError>;

    async fn delete_course(&self, id: Uuid) -> Result<(), RepoError>;

    async fn count_courses_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    /// Appends a course id to the user's enrollment list.
    async fn append_enrollment(&self, user_id: Uuid, course_id: Uuid) -> Result<(), RepoError>;

    async fn count_users_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait NotificationsRepo: Send + Sync {
    async fn create_notification(
        &self,
        params: NewNotificationParams,
    ) -> Result<NotificationRecord, RepoError>;

    /// Lists every notification, newest first.
    async fn list_notifications(&self) -> Result<Vec<NotificationRecord>, RepoError>;

    async fn mark_notification_read(
        &self,
        id: Uuid,
        read_at: OffsetDateTime,
    ) -> Result<NotificationRecord, RepoError>;

    /// Deletes read notifications created before the cutoff, returning how
    /// many rows went away.
    async fn delete_read_notifications_before(
        &self,
        cutoff: OffsetDateTime,
    ) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait OrdersRepo: Send + Sync {
    async fn create_order(&self, params: NewOrderParams) -> Result<OrderRecord, RepoError>;

    /// Lists every order, newest first.
    async fn list_orders(&self) -> Result<Vec<OrderRecord>, RepoError>;

    async fn count_orders_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn find_session_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>, RepoError>;
}
