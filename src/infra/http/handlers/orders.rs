//! Order handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use aula_api_types::CreateOrderRequest;

use crate::application::error::AppError;
use crate::application::orders::CreateOrderCommand;
use crate::application::sessions::Principal;
use crate::infra::http::state::ApiState;

pub async fn create_order(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let command = CreateOrderCommand {
        course_id: payload.course_id,
        payment: payload.payment,
    };
    let order = state.orders.create_order(&principal, command).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": order })),
    ))
}

pub async fn list_orders_admin(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_orders_admin().await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}
