//! Course catalog handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use aula_api_types::{CourseUpsertRequest, MessageBody};

use crate::application::catalog::{NewContentItem, UpsertCourseCommand};
use crate::application::error::AppError;
use crate::application::sessions::Principal;
use crate::domain::courses::{ContentLink, Thumbnail};
use crate::infra::http::state::ApiState;

pub async fn single_course(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course = state.catalog.single_course(id).await?;
    Ok(Json(json!({ "success": true, "course": course })))
}

pub async fn all_courses(State(state): State<ApiState>) -> Result<impl IntoResponse, AppError> {
    let courses = state.catalog.all_courses().await?;
    Ok(Json(json!({ "success": true, "courses": courses })))
}

pub async fn course_content(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let content = state.catalog.course_content(&principal, id).await?;
    Ok(Json(json!({ "success": true, "content": content })))
}

pub async fn create_course(
    State(state): State<ApiState>,
    Json(payload): Json<CourseUpsertRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = state.catalog.create_course(upsert_command(payload)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "course": course })),
    ))
}

pub async fn edit_course(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseUpsertRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = state
        .catalog
        .edit_course(id, upsert_command(payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "course": course })),
    ))
}

pub async fn list_courses_admin(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, AppError> {
    let courses = state.catalog.list_courses_admin().await?;
    Ok(Json(json!({ "success": true, "courses": courses })))
}

pub async fn delete_course(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.delete_course(id).await?;
    Ok(Json(MessageBody::ok("Course deleted successfully")))
}

fn upsert_command(payload: CourseUpsertRequest) -> UpsertCourseCommand {
    UpsertCourseCommand {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        thumbnail: payload.thumbnail.map(|thumb| Thumbnail {
            ref_id: thumb.ref_id,
            url: thumb.url,
        }),
        contents: payload
            .course_data
            .into_iter()
            .map(|item| NewContentItem {
                title: item.title,
                description: item.description,
                video_url: item.video_url,
                video_length_minutes: item.video_length_minutes,
                links: item
                    .links
                    .into_iter()
                    .map(|link| ContentLink {
                        title: link.title,
                        url: link.url,
                    })
                    .collect(),
                suggestion: item.suggestion,
            })
            .collect(),
    }
}
