//! Course catalog: cached public reads and admin CRUD.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::CoursesRepo;
use crate::application::sessions::Principal;
use crate::cache::CourseCache;
use crate::domain::courses::{ContentItem, ContentLink, CourseDocument, Thumbnail};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub struct NewContentItem {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_length_minutes: u32,
    pub links: Vec<ContentLink>,
    pub suggestion: Option<String>,
}

impl NewContentItem {
    fn into_item(self) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            video_url: self.video_url,
            video_length_minutes: self.video_length_minutes,
            links: self.links,
            suggestion: self.suggestion,
            questions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertCourseCommand {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub thumbnail: Option<Thumbnail>,
    pub contents: Vec<NewContentItem>,
}

#[derive(Clone)]
pub struct CatalogService {
    courses: Arc<dyn CoursesRepo>,
    cache: Arc<CourseCache>,
}

impl CatalogService {
    pub fn new(courses: Arc<dyn CoursesRepo>, cache: Arc<CourseCache>) -> Self {
        Self { courses, cache }
    }

    /// Filtered single-course payload for unauthenticated readers.
    ///
    /// Cache first; on a miss the projection of the canonical document is
    /// stored under the course id and served. Writes elsewhere never touch
    /// the stored payload, so it can lag the database until it expires.
    pub async fn single_course(&self, id: Uuid) -> Result<Value, AppError> {
        if let Some(payload) = self.cache.get_course(id) {
            let value = serde_json::from_slice(&payload)?;
            return Ok(value);
        }

        let document = self
            .courses
            .find_course(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Course"))?;
        let value = serde_json::to_value(document.preview())?;
        self.cache
            .set_course(id, Bytes::from(serde_json::to_vec(&value)?));
        Ok(value)
    }

    /// Filtered catalog payload for unauthenticated readers. The stored
    /// payload has no expiry and is only replaced by the next miss.
    pub async fn all_courses(&self) -> Result<Value, AppError> {
        if let Some(payload) = self.cache.get_catalog() {
            let value = serde_json::from_slice(&payload)?;
            return Ok(value);
        }

        let documents = self.courses.list_courses().await?;
        let previews: Vec<_> = documents
            .iter()
            .map(CourseDocument::preview)
            .collect();
        let value = serde_json::to_value(previews)?;
        self.cache
            .set_catalog(Bytes::from(serde_json::to_vec(&value)?));
        Ok(value)
    }

    /// Full lecture content for an enrolled reader.
    pub async fn course_content(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Vec<ContentItem>, AppError> {
        principal.require_enrollment(id)?;
        let document = self
            .courses
            .find_course(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Course"))?;
        Ok(document.course_data)
    }

    pub async fn create_course(
        &self,
        command: UpsertCourseCommand,
    ) -> Result<CourseDocument, AppError> {
        Self::validate(&command)?;

        let now = OffsetDateTime::now_utc();
        let document = CourseDocument {
            id: Uuid::new_v4(),
            name: command.name,
            description: command.description,
            price: command.price,
            thumbnail: command.thumbnail,
            ratings: 0.0,
            course_data: command
                .contents
                .into_iter()
                .map(NewContentItem::into_item)
                .collect(),
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.courses.create_course(&document).await?;
        Ok(document)
    }

    /// Whole-field update. Lecture content is replaced wholesale, which
    /// discards any questions attached to the old items; reviews and
    /// ratings survive. The cache is deliberately left alone.
    pub async fn edit_course(
        &self,
        id: Uuid,
        command: UpsertCourseCommand,
    ) -> Result<CourseDocument, AppError> {
        Self::validate(&command)?;

        let mut document = self
            .courses
            .find_course(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Course"))?;
        document.name = command.name;
        document.description = command.description;
        document.price = command.price;
        document.thumbnail = command.thumbnail;
        document.course_data = command
            .contents
            .into_iter()
            .map(NewContentItem::into_item)
            .collect();
        document.updated_at = OffsetDateTime::now_utc();

        self.courses.save_course(&document).await?;
        Ok(document)
    }

    /// Canonical (unfiltered) list for the admin panel, newest first.
    pub async fn list_courses_admin(&self) -> Result<Vec<CourseDocument>, AppError> {
        Ok(self.courses.list_courses().await?)
    }

    /// Deletes the document and evicts its single-course payload. The
    /// catalog payload stays as is.
    pub async fn delete_course(&self, id: Uuid) -> Result<(), AppError> {
        self.courses
            .find_course(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Course"))?;
        self.courses.delete_course(id).await?;
        self.cache.evict_course(id);
        Ok(())
    }

    fn validate(command: &UpsertCourseCommand) -> Result<(), DomainError> {
        ensure_non_empty(&command.name, "name")?;
        ensure_non_empty(&command.description, "description")?;
        if command.price < 0.0 {
            return Err(DomainError::validation("price must not be negative"));
        }
        Ok(())
    }
}

pub(crate) fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
