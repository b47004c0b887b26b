//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::{CrudDescriptor, EntityRegistry};
use super::exposure::RestExposure;
use super::handlers::Resource;
use crate::config::ServerConfig;
use crate::core::error::ConfigError;
use crate::entities::{
    Batch, BatchTestResult, Customer, Machine, Product, QcKpi, Report, TestResult,
};
use crate::storage::InMemoryStore;
use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers with auto-registered routes
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(InMemoryStore::new())
///     .register::<Product>()?
///     .register::<Batch>()?
///     .build();
/// ```
pub struct ServerBuilder {
    store: InMemoryStore,
    config: ServerConfig,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder serving `store`
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            config: ServerConfig::default(),
            entity_registry: EntityRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Use the given listener settings
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that don't fit the CRUD pattern, such as
    /// dashboards or report exports.
    ///
    /// ```ignore
    /// let extra = Router::new().route("/api/summary", get(summary_handler));
    ///
    /// ServerBuilder::new(store)
    ///     .with_custom_routes(extra)
    ///     .register_lab_entities()?
    ///     .build();
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register one entity kind
    ///
    /// Fails when the kind is already registered or when its query spec
    /// reads through a load path it does not declare.
    pub fn register<E: Resource>(mut self) -> Result<Self, ConfigError> {
        self.entity_registry
            .register(Box::new(CrudDescriptor::<E>::new()))?;
        Ok(self)
    }

    /// Register every laboratory entity kind
    pub fn register_lab_entities(self) -> Result<Self, ConfigError> {
        self.register::<Product>()?
            .register::<Machine>()?
            .register::<Customer>()?
            .register::<Batch>()?
            .register::<TestResult>()?
            .register::<BatchTestResult>()?
            .register::<QcKpi>()?
            .register::<Report>()
    }

    /// Entity types registered so far
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }

    /// Collection paths of the kinds registered so far
    pub fn collection_paths(&self) -> Vec<String> {
        self.entity_registry.collection_paths()
    }

    /// Build the final REST router
    pub fn build(self) -> Router {
        RestExposure::build_router(
            &self.entity_registry,
            &self.store,
            &self.config,
            self.custom_routes,
        )
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new(store)
    ///     .register_lab_entities()?
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let entities = self.entity_types().len();
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(entities, "Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new(InMemoryStore::new())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
