pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id/artifacts",
            get(handlers::handle_get_artifacts),
        )
        .route(
            "/api/v1/sessions/:id/generate",
            post(handlers::handle_generate),
        )
        .route(
            "/api/v1/sessions/:id/generate-all",
            post(handlers::handle_generate_all),
        )
        .route(
            "/api/v1/sessions/:id/refine",
            post(handlers::handle_refine),
        )
        .route(
            "/api/v1/sessions/:id/suggestions",
            post(handlers::handle_suggestions),
        )
        .with_state(state)
}
