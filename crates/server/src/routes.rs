use std::any::Any;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use common::types::Health;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub mod users;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Plain-text wall-clock time, handy for checking the process is alive.
pub async fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer, request_timeout: Duration) -> Router {
    let users = Router::new()
        .route("/api/v1/users", get(users::list_users).post(users::create_user))
        .route("/api/v1/users/", get(users::list_users).post(users::create_user))
        .route(
            "/api/v1/users/:id",
            get(users::get_user).patch(users::update_user).delete(users::delete_user),
        );

    let app = Router::new()
        .route("/", get(now))
        .route("/health", get(health))
        .merge(users)
        .with_state(state);
    with_middleware(app, cors, request_timeout)
}

/// Wrap a router in the shared middleware stack.
///
/// Outermost first: request id assignment and echo, tracing, CORS, timeout,
/// then panic recovery right around the handlers.
pub fn with_middleware(router: Router, cors: CorsLayer, request_timeout: Duration) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = detail, "request handler panicked");
    JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None).into_response()
}
