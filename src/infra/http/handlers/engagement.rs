//! Q&A and review handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use aula_api_types::{
    AddAnswerRequest, AddQuestionRequest, AddReviewReplyRequest, AddReviewRequest,
};

use crate::application::engagement::{
    AddAnswerCommand, AddQuestionCommand, AddReviewCommand, AddReviewReplyCommand,
};
use crate::application::error::AppError;
use crate::application::sessions::Principal;
use crate::infra::http::state::ApiState;

pub async fn add_question(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AddQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let command = AddQuestionCommand {
        course_id: payload.course_id,
        content_id: payload.content_id,
        question: payload.question,
    };
    let course = state.engagement.add_question(&principal, command).await?;
    Ok(Json(json!({ "success": true, "course": course })))
}

pub async fn add_answer(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AddAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let command = AddAnswerCommand {
        course_id: payload.course_id,
        content_id: payload.content_id,
        question_id: payload.question_id,
        answer: payload.answer,
    };
    let course = state.engagement.add_answer(&principal, command).await?;
    Ok(Json(json!({ "success": true, "course": course })))
}

pub async fn add_review(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let command = AddReviewCommand {
        course_id: id,
        review: payload.review,
        rating: payload.rating,
    };
    let course = state.engagement.add_review(&principal, command).await?;
    Ok(Json(json!({ "success": true, "course": course })))
}

pub async fn add_review_reply(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AddReviewReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let command = AddReviewReplyCommand {
        course_id: payload.course_id,
        review_id: payload.review_id,
        comment: payload.comment,
    };
    let course = state
        .engagement
        .add_review_reply(&principal, command)
        .await?;
    Ok(Json(json!({ "success": true, "course": course })))
}
