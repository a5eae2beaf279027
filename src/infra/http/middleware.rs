use std::time::Instant;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

use aula_api_types::MessageBody;

use crate::application::error::ErrorReport;
use crate::application::sessions::{Principal, SessionAuthError};

use super::state::ApiState;

/// Session cookie set by the identity frontend.
pub const SESSION_COOKIE: &str = "aula_session";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let (user_id, role) = match request.extensions().get::<Principal>() {
        Some(principal) => (
            Some(principal.user_id.to_string()),
            Some(principal.role.as_str()),
        ),
        None => (None, None),
    };

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "aula::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user_id = user_id.as_deref().unwrap_or(""),
                role = role.unwrap_or(""),
                "request failed",
            );
        } else {
            warn!(
                target = "aula::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                user_id = user_id.as_deref().unwrap_or(""),
                role = role.unwrap_or(""),
                "client request error",
            );
        }
    }

    response
}

/// Resolves the session token into a [`Principal`] and stores it in request
/// extensions. The cookie wins over the `Authorization` header.
pub async fn session_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = session_cookie(request.headers()).or_else(|| bearer_token(request.headers()));

    let token = match token {
        Some(value) => value,
        None => return unauthorized("Please login to access this resource"),
    };

    let principal = match state.sessions.authenticate(&token).await {
        Ok(principal) => principal,
        Err(SessionAuthError::Missing | SessionAuthError::Expired) => {
            return unauthorized("Please login to access this resource");
        }
        Err(SessionAuthError::Invalid) => {
            return unauthorized("Access token is not valid");
        }
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// Role gate layered inside [`session_auth`] on the admin routes.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<Principal>() {
        Some(principal) if principal.is_admin() => next.run(request).await,
        Some(_) => forbidden(),
        None => {
            warn!(
                target = "aula::http::auth",
                "missing principal in admin gate"
            );
            unauthorized("Please login to access this resource")
        }
    }
}

/// Sliding-window limiter keyed by principal and route, layered inside
/// [`session_auth`] on the mutation routes.
pub async fn rate_limit(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let principal = match request.extensions().get::<Principal>() {
        Some(principal) => principal,
        None => {
            warn!(
                target = "aula::http::ratelimit",
                "missing principal in rate limit middleware"
            );
            return unauthorized("Please login to access this resource");
        }
    };

    let key = principal.user_id.to_string();
    if !state.rate_limiter.allow(&key, &path) {
        return rate_limited(state.rate_limiter.retry_after_secs());
    }

    next.run(request).await
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.trim().to_string())
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?;
    Some(bearer.trim().to_string())
}

fn unauthorized(message: &'static str) -> Response {
    let mut response =
        (StatusCode::UNAUTHORIZED, Json(MessageBody::error(message))).into_response();
    ErrorReport::from_message(
        "infra::http::session_auth",
        StatusCode::UNAUTHORIZED,
        message,
    )
    .attach(&mut response);
    response
}

fn forbidden() -> Response {
    let message = "You are not allowed to access this resource";
    let mut response = (StatusCode::FORBIDDEN, Json(MessageBody::error(message))).into_response();
    ErrorReport::from_message("infra::http::require_admin", StatusCode::FORBIDDEN, message)
        .attach(&mut response);
    response
}

fn rate_limited(retry_after: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(MessageBody::error("Rate limit exceeded")),
    )
        .into_response();
    if let Ok(value) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
        response
            .headers_mut()
            .insert(axum::http::header::RETRY_AFTER, value);
    }
    ErrorReport::from_message(
        "infra::http::rate_limit",
        StatusCode::TOO_MANY_REQUESTS,
        format!("rate_limited: retry_after={retry_after}"),
    )
    .attach(&mut response);
    response
}
