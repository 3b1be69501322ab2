pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use super::middleware::{RequestDeadline, enforce_deadline, log_responses, set_request_context};

/// Build the post API router.
///
/// `/posts/search-by-tag` and `/posts/search` are registered as static segments, so they win
/// over the `{id}` capture.
pub fn build_router(state: ApiState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/posts", post(handlers::create_post))
        .route("/posts/search-by-tag", get(handlers::search_by_tag))
        .route("/posts/search", get(handlers::search_text))
        .route(
            "/posts/{id}",
            get(handlers::get_post).put(handlers::update_post),
        )
        .route("/_health/db", get(handlers::db_health))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            RequestDeadline(request_timeout),
            enforce_deadline,
        ))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
