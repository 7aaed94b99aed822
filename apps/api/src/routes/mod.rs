pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/projects", post(handlers::handle_start_project))
        .route(
            "/api/v1/projects/:session_id/document",
            post(handlers::handle_upload_document),
        )
        .route(
            "/api/v1/projects/:session_id/responses",
            post(handlers::handle_submit_response),
        )
        .route(
            "/api/v1/projects/:session_id/analysis",
            post(handlers::handle_analyze),
        )
        .with_state(state)
}
