//! HTTP surface: routing, session middleware, and the JSON envelope
//! handlers.

pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod state;

pub use middleware::{RequestContext, SESSION_COOKIE};
pub use rate_limit::ApiRateLimiter;
pub use state::ApiState;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;

/// Assembles the full route tree. Three tiers share one state: public reads,
/// session-gated routes (mutations also rate-limited), and admin routes.
pub fn build_router(state: ApiState) -> Router {
    let public = Router::new()
        .route("/api/v1/courses", get(handlers::courses::all_courses))
        .route("/api/v1/courses/{id}", get(handlers::courses::single_course))
        .route("/healthz/db", get(db_health))
        .with_state(state.clone());

    let session_reads = Router::new()
        .route(
            "/api/v1/courses/{id}/content",
            get(handlers::courses::course_content),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_auth,
        ))
        .with_state(state.clone());

    let session_mutations = Router::new()
        .route(
            "/api/v1/courses/questions",
            post(handlers::engagement::add_question),
        )
        .route(
            "/api/v1/courses/answers",
            post(handlers::engagement::add_answer),
        )
        .route(
            "/api/v1/courses/{id}/reviews",
            post(handlers::engagement::add_review),
        )
        .route(
            "/api/v1/courses/reviews/replies",
            post(handlers::engagement::add_review_reply),
        )
        .route("/api/v1/orders", post(handlers::orders::create_order))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_auth,
        ))
        .with_state(state.clone());

    let admin_reads = Router::new()
        .route(
            "/api/v1/admin/courses",
            get(handlers::courses::list_courses_admin),
        )
        .route(
            "/api/v1/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/v1/admin/orders",
            get(handlers::orders::list_orders_admin),
        )
        .route(
            "/api/v1/admin/analytics/users",
            get(handlers::analytics::users_series),
        )
        .route(
            "/api/v1/admin/analytics/courses",
            get(handlers::analytics::courses_series),
        )
        .route(
            "/api/v1/admin/analytics/orders",
            get(handlers::analytics::orders_series),
        )
        .layer(axum_middleware::from_fn(middleware::require_admin))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_auth,
        ))
        .with_state(state.clone());

    let admin_mutations = Router::new()
        .route("/api/v1/courses", post(handlers::courses::create_course))
        .route(
            "/api/v1/courses/{id}",
            put(handlers::courses::edit_course).delete(handlers::courses::delete_course),
        )
        .route(
            "/api/v1/notifications/{id}",
            put(handlers::notifications::mark_notification_read),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum_middleware::from_fn(middleware::require_admin))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_auth,
        ))
        .with_state(state);

    Router::new()
        .merge(public)
        .merge(session_reads)
        .merge(session_mutations)
        .merge(admin_reads)
        .merge(admin_mutations)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn db_health(State(state): State<ApiState>) -> Response {
    db_health_response(state.db.health_check().await)
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
