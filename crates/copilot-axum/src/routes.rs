//! Route definitions and router construction.

use axum::Router;
use axum::routing::{delete, get, post, put};
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

/// All API routes without the `/api` prefix (the caller nests them).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        // Chat
        .route("/chat", post(handlers::chat::chat))
        // Preconfigured catalog
        .route("/mcp-servers-config", get(handlers::mcp_config::get))
        // MCP registry
        .route(
            "/mcp/servers",
            get(handlers::mcp_servers::list).post(handlers::mcp_servers::add),
        )
        .route("/mcp/servers/{id}", delete(handlers::mcp_servers::remove))
        .route("/mcp/servers/{id}/toggle", post(handlers::mcp_servers::toggle))
        .route(
            "/mcp/servers/{id}/headers",
            put(handlers::mcp_servers::update_headers),
        )
        .route(
            "/mcp/servers/{id}/enabled",
            put(handlers::mcp_servers::set_enabled),
        )
        .route("/mcp/presets/{name}", post(handlers::mcp_servers::add_preset))
        // Tokens
        .route(
            "/tokens",
            get(handlers::tokens::list).post(handlers::tokens::add),
        )
        .route("/tokens/{id}", delete(handlers::tokens::remove))
        .route("/tokens/{id}/activate", post(handlers::tokens::activate))
        // Instances
        .route(
            "/instances",
            get(handlers::instances::list).post(handlers::instances::add),
        )
        .route(
            "/instances/{id}",
            put(handlers::instances::update).delete(handlers::instances::remove),
        )
        // Transfer
        .route("/export", get(handlers::transfer::export))
        .route("/import", post(handlers::transfer::import))
        // Feature flags
        .route(
            "/feature-flags",
            get(handlers::feature_flags::get).put(handlers::feature_flags::update),
        )
}

/// Create the main Axum router.
///
/// Axum 0.8 uses brace syntax for path parameters: `{id}`, `{name}`.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
