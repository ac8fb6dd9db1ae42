//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth,
    config::Config,
    maintenance::{self, ConfigStore},
    session,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Sitewide configuration store
    pub store: Arc<dyn ConfigStore>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            store,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Maintenance settings require the settings-management capability
    let admin_routes = maintenance::settings::router().layer(from_fn_with_state(
        state.clone(),
        auth::require_settings_manage,
    ));

    // Protected routes that require authentication
    let protected_routes = Router::new()
        .route("/api/session", get(session::get_session))
        .nest("/api/admin/maintenance", admin_routes)
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Public sitewide banners
        .route(
            "/api/messages/active",
            get(maintenance::banner::list_active_messages),
        )
        // Protected session and admin routes
        .merge(protected_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
