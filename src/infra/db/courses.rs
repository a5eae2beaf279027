use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CoursesRepo, RepoError};
use crate::domain::courses::CourseDocument;

use super::{PostgresRepositories, map_sqlx_error};

/// Courses live in a single JSONB column; the relational part of the row is
/// just the id and the timestamps the list ordering and analytics need.
fn decode_document(value: Value) -> Result<CourseDocument, RepoError> {
    serde_json::from_value(value).map_err(|err| RepoError::Integrity {
        message: format!("stored course document does not deserialize: {err}"),
    })
}

fn encode_document(document: &CourseDocument) -> Result<Value, RepoError> {
    serde_json::to_value(document).map_err(|err| RepoError::Integrity {
        message: format!("course document does not serialize: {err}"),
    })
}

#[async_trait]
impl CoursesRepo for PostgresRepositories {
    async fn find_course(&self, id: Uuid) -> Result<Option<CourseDocument>, RepoError> {
        let value: Option<Value> = sqlx::query_scalar("SELECT document FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        value.map(decode_document).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<CourseDocument>, RepoError> {
        let values: Vec<Value> =
            sqlx::query_scalar("SELECT document FROM courses ORDER BY created_at DESC")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        values.into_iter().map(decode_document).collect()
    }

    async fn create_course(&self, document: &CourseDocument) -> Result<(), RepoError> {
        let value = encode_document(document)?;
        sqlx::query(
            "INSERT INTO courses (id, document, created_at, updated_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(document.id)
        .bind(value)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn save_course(&self, document: &CourseDocument) -> Result<(), RepoError> {
        let value = encode_document(document)?;
        let result = sqlx::query("UPDATE courses SET document = $2, updated_at = $3 WHERE id = $1")
            .bind(document.id)
            .bind(value)
            .bind(document.updated_at)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn count_courses_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<i64, RepoError> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM courses WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
