//! Admin analytics handlers

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;

use crate::application::error::AppError;
use crate::infra::http::state::ApiState;

pub async fn users_series(State(state): State<ApiState>) -> Result<impl IntoResponse, AppError> {
    let users = state.analytics.users_series().await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

/// The courses series rides under a singular `course` key; the admin panel
/// reads exactly that name.
pub async fn courses_series(State(state): State<ApiState>) -> Result<impl IntoResponse, AppError> {
    let course = state.analytics.courses_series().await?;
    Ok(Json(json!({ "success": true, "course": course })))
}

pub async fn orders_series(State(state): State<ApiState>) -> Result<impl IntoResponse, AppError> {
    let orders = state.analytics.orders_series().await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}
