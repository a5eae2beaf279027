//! Shared request and response types for the Aula course platform API.
//!
//! These types describe the JSON wire format only. Server-side records and
//! their invariants live in the `aula` crate; clients should depend on this
//! crate to stay in sync with the HTTP surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uploaded asset reference, as produced by the media pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThumbnailInput {
    #[serde(rename = "ref")]
    pub ref_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentLinkInput {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentItemInput {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_length_minutes: u32,
    #[serde(default)]
    pub links: Vec<ContentLinkInput>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Body for `POST /api/v1/courses` and `PUT /api/v1/courses/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CourseUpsertRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailInput>,
    #[serde(default)]
    pub course_data: Vec<ContentItemInput>,
}

/// Body for `POST /api/v1/courses/questions`.
///
/// `content_id` is carried as a string so the server can reject malformed
/// ids with its own validation error rather than a framework rejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddQuestionRequest {
    pub question: String,
    pub course_id: Uuid,
    pub content_id: String,
}

/// Body for `POST /api/v1/courses/answers`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddAnswerRequest {
    pub answer: String,
    pub course_id: Uuid,
    pub content_id: String,
    pub question_id: Uuid,
}

/// Body for `POST /api/v1/courses/{id}/reviews`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddReviewRequest {
    pub review: String,
    pub rating: f64,
}

/// Body for `POST /api/v1/courses/reviews/replies`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddReviewReplyRequest {
    pub comment: String,
    pub course_id: Uuid,
    pub review_id: Uuid,
}

/// Body for `POST /api/v1/orders`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateOrderRequest {
    pub course_id: Uuid,
    #[serde(default)]
    pub payment: Option<serde_json::Value>,
}

/// Plain `{success, message}` body, used for deletions and error responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

impl MessageBody {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One labeled window in an analytics series.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonthBucket {
    pub month: String,
    pub count: i64,
}

/// Twelve trailing windows, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AnalyticsSeries {
    pub last_12_months: Vec<MonthBucket>,
}
