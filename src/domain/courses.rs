//! Course documents and the nested-entity locator.
//!
//! A course is persisted as one JSON document: content items hold their
//! questions, questions hold their replies, and reviews hang off the course
//! itself. Every mutation loads the document, locates the nested target by
//! id, appends, and saves the whole document back.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Compact author reference embedded in nested entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(rename = "ref")]
    pub ref_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Uuid,
    pub author: UserRef,
    pub answer: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Reply {
    pub fn new(author: UserRef, answer: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            answer: answer.into(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub author: UserRef,
    pub question: String,
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Question {
    pub fn new(author: UserRef, question: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            question: question.into(),
            replies: Vec::new(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReply {
    pub id: Uuid,
    pub author: UserRef,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ReviewReply {
    pub fn new(author: UserRef, comment: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            comment: comment.into(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub author: UserRef,
    pub comment: String,
    pub rating: f64,
    #[serde(default)]
    pub replies: Vec<ReviewReply>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Review {
    pub fn new(
        author: UserRef,
        comment: impl Into<String>,
        rating: f64,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            comment: comment.into(),
            rating,
            replies: Vec::new(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_length_minutes: u32,
    #[serde(default)]
    pub links: Vec<ContentLink>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Canonical course document. Stored whole; saved whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDocument {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    /// Arithmetic mean of all review ratings; recomputed on every review.
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub course_data: Vec<ContentItem>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CourseDocument {
    /// Locates a content item by id within this document only.
    pub fn content_mut(&mut self, content_id: Uuid) -> Result<&mut ContentItem, DomainError> {
        self.course_data
            .iter_mut()
            .find(|item| item.id == content_id)
            .ok_or_else(|| DomainError::not_found("Course content"))
    }

    /// Locates a question through the content item that owns it.
    pub fn question_mut(
        &mut self,
        content_id: Uuid,
        question_id: Uuid,
    ) -> Result<&mut Question, DomainError> {
        let content = self.content_mut(content_id)?;
        content
            .questions
            .iter_mut()
            .find(|question| question.id == question_id)
            .ok_or_else(|| DomainError::not_found("Question"))
    }

    /// Locates a review by id within this document only.
    pub fn review_mut(&mut self, review_id: Uuid) -> Result<&mut Review, DomainError> {
        self.reviews
            .iter_mut()
            .find(|review| review.id == review_id)
            .ok_or_else(|| DomainError::not_found("Review"))
    }

    /// Recomputes `ratings` as the mean of all review ratings.
    pub fn recompute_ratings(&mut self) {
        if self.reviews.is_empty() {
            self.ratings = 0.0;
            return;
        }
        let total: f64 = self.reviews.iter().map(|review| review.rating).sum();
        self.ratings = total / self.reviews.len() as f64;
    }

    /// Public projection served by the uncredentialed catalog routes: content
    /// items are stripped of `video_url`, `suggestion`, `questions` and
    /// `links`.
    pub fn preview(&self) -> CoursePreview {
        CoursePreview {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            thumbnail: self.thumbnail.clone(),
            ratings: self.ratings,
            course_data: self
                .course_data
                .iter()
                .map(|item| ContentOutline {
                    id: item.id,
                    title: item.title.clone(),
                    description: item.description.clone(),
                    video_length_minutes: item.video_length_minutes,
                })
                .collect(),
            reviews: self.reviews.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Content item as exposed to non-enrolled readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentOutline {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_length_minutes: u32,
}

/// Course shape served by the public catalog routes and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePreview {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub thumbnail: Option<Thumbnail>,
    pub ratings: f64,
    pub course_data: Vec<ContentOutline>,
    pub reviews: Vec<Review>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Content ids arrive as free-form strings; malformed ids are a validation
/// failure, not a missing entity.
pub fn parse_content_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|_| DomainError::validation("Invalid content id"))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn author(name: &str) -> UserRef {
        UserRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn course_with_content() -> CourseDocument {
        let now = datetime!(2026-01-10 09:00 UTC);
        CourseDocument {
            id: Uuid::new_v4(),
            name: "Systems Programming".to_string(),
            description: "Pointers and pain".to_string(),
            price: 49.0,
            thumbnail: None,
            ratings: 0.0,
            course_data: vec![ContentItem {
                id: Uuid::new_v4(),
                title: "Lesson 1".to_string(),
                description: "Intro".to_string(),
                video_url: "https://videos.example/1".to_string(),
                video_length_minutes: 12,
                links: vec![ContentLink {
                    title: "Slides".to_string(),
                    url: "https://example.test/slides".to_string(),
                }],
                suggestion: Some("watch twice".to_string()),
                questions: Vec::new(),
            }],
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn locator_walks_content_question_chain() {
        let mut course = course_with_content();
        let content_id = course.course_data[0].id;
        let question = Question::new(author("Ada"), "Why?", datetime!(2026-01-11 10:00 UTC));
        let question_id = question.id;
        course.course_data[0].questions.push(question);

        let found = course
            .question_mut(content_id, question_id)
            .unwrap_or_else(|err| panic!("expected question, got {err}"));
        assert_eq!(found.question, "Why?");
        assert!(found.replies.is_empty());
    }

    #[test]
    fn locator_rejects_ids_from_other_documents() {
        let mut course = course_with_content();
        let foreign = Uuid::new_v4();

        let err = course.content_mut(foreign).unwrap_err();
        assert_eq!(err.to_string(), "Course content not found");

        let content_id = course.course_data[0].id;
        let err = course.question_mut(content_id, foreign).unwrap_err();
        assert_eq!(err.to_string(), "Question not found");

        let err = course.review_mut(foreign).unwrap_err();
        assert_eq!(err.to_string(), "Review not found");
    }

    #[test]
    fn malformed_content_id_is_a_validation_error() {
        let err = parse_content_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(err.to_string(), "Invalid content id");
    }

    #[test]
    fn ratings_track_the_mean_of_all_reviews() {
        let mut course = course_with_content();
        let at = datetime!(2026-01-12 08:00 UTC);
        course.reviews.push(Review::new(author("Ada"), "solid", 5.0, at));
        course.recompute_ratings();
        assert!((course.ratings - 5.0).abs() < 1e-9);

        course.reviews.push(Review::new(author("Grace"), "okay", 2.0, at));
        course.recompute_ratings();
        assert!((course.ratings - 3.5).abs() < 1e-9);

        course.reviews.push(Review::new(author("Linus"), "meh", 3.0, at));
        course.recompute_ratings();
        assert!((course.ratings - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn preview_strips_protected_content_fields() {
        let mut course = course_with_content();
        course.course_data[0]
            .questions
            .push(Question::new(author("Ada"), "Why?", course.created_at));

        let value = serde_json::to_value(course.preview()).expect("serializable preview");
        let item = &value["course_data"][0];
        assert_eq!(item["title"], "Lesson 1");
        assert!(item.get("video_url").is_none());
        assert!(item.get("suggestion").is_none());
        assert!(item.get("questions").is_none());
        assert!(item.get("links").is_none());
        assert_eq!(value["created_at"], "2026-01-10T09:00:00Z");
    }
}
