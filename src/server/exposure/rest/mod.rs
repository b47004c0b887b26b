//! REST API exposure
//!
//! Consumes the entity registry and the store and produces an Axum `Router`
//! with health checks, CRUD routes for every registered kind and any custom
//! routes, wrapped in request tracing.

use crate::config::ServerConfig;
use crate::server::entity_registry::EntityRegistry;
use crate::storage::InMemoryStore;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - Entity CRUD routes under `/api`
    /// - Custom routes
    pub fn build_router(
        registry: &EntityRegistry,
        store: &InMemoryStore,
        config: &ServerConfig,
        custom_routes: Vec<Router>,
    ) -> Router {
        let mut app = Self::health_routes().merge(registry.build_routes(store));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        if config.cors {
            app = app.layer(CorsLayer::permissive());
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "labqc"
        }))
    }
}
