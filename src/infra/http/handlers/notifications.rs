//! Admin notification feed handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::infra::http::state::ApiState;

pub async fn list_notifications(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.notifications.list().await?;
    Ok(Json(
        json!({ "success": true, "notifications": notifications }),
    ))
}

/// Marks one notification read and answers with the refreshed full list.
pub async fn mark_notification_read(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.notifications.mark_read(id).await?;
    Ok(Json(
        json!({ "success": true, "notifications": notifications }),
    ))
}
