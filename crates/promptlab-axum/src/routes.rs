//! Route definitions and router construction.
//!
//! This module defines the HTTP routes and creates the main router.
//! Handlers delegate to the shared `AppCore` facade.

use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build all API routes without `/api` prefix (for nesting under /api).
///
/// The caller must apply `.with_state()` before nesting.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        // Prompts API
        .route(
            "/prompts",
            get(handlers::prompts::list).post(handlers::prompts::create),
        )
        .route(
            "/prompts/{id}",
            get(handlers::prompts::get)
                .put(handlers::prompts::update)
                .delete(handlers::prompts::remove),
        )
        // Library API
        .route("/export-library", post(handlers::library::export))
        .route("/import-library", post(handlers::library::import))
        // Playground API
        .route("/refine-prompt", post(handlers::ollama::refine))
        .route("/run-test", post(handlers::ollama::run_test))
        .route("/models", get(handlers::ollama::models))
        .route(
            "/models/cache",
            get(handlers::ollama::cache_info).delete(handlers::ollama::clear_cache),
        )
        .route("/ollama/health", get(handlers::ollama::health))
        // Config API
        .route(
            "/config",
            get(handlers::config::get).put(handlers::config::update),
        )
        .route(
            "/config/test-connection",
            post(handlers::config::test_connection),
        )
        .route("/config/save", post(handlers::config::save))
        .route("/config/load", post(handlers::config::load))
        .route("/config/models", get(handlers::config::models))
}

/// Create the main Axum router with all API routes under `/api`.
///
/// # Path Parameter Syntax
/// Axum 0.8 uses brace syntax for path parameters: `{id}`
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .nest("/api", api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Liveness check; does not touch the model endpoint.
pub(crate) async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "PromptLab Backend" }))
}
