//! Entity registry for managing entity descriptors and auto-generating CRUD routes

use super::handlers::{self, Resource};
use crate::core::error::ConfigError;
use crate::storage::InMemoryStore;
use axum::{Router, routing::get};
use indexmap::IndexMap;
use std::marker::PhantomData;

/// Trait that describes how to build routes for an entity kind
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "batch")
    fn entity_type(&self) -> &str;

    /// The plural form (e.g., "batches")
    fn plural(&self) -> &str;

    /// Check the kind's query declarations before serving it
    fn validate(&self) -> Result<(), ConfigError>;

    /// Build the CRUD routes for this entity kind
    ///
    /// Should return a Router with routes like:
    /// - GET/POST /api/{plural}
    /// - GET/PUT/DELETE /api/{plural}/{id}
    fn build_routes(&self, store: InMemoryStore) -> Router;
}

/// Descriptor serving any [`Resource`] through the generic handlers
pub struct CrudDescriptor<E> {
    _kind: PhantomData<fn() -> E>,
}

impl<E> CrudDescriptor<E> {
    pub fn new() -> Self {
        Self { _kind: PhantomData }
    }
}

impl<E> Default for CrudDescriptor<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Resource> EntityDescriptor for CrudDescriptor<E> {
    fn entity_type(&self) -> &str {
        E::resource_name_singular()
    }

    fn plural(&self) -> &str {
        E::resource_name()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        E::query_spec().validate()
    }

    fn build_routes(&self, store: InMemoryStore) -> Router {
        let collection = format!("/api/{}", E::resource_name());
        let item = format!("{}/{{id}}", collection);

        Router::new()
            .route(&collection, get(handlers::list::<E>).post(handlers::create::<E>))
            .route(
                &item,
                get(handlers::get::<E>)
                    .put(handlers::update::<E>)
                    .delete(handlers::delete::<E>),
            )
            .with_state(store)
    }
}

/// Registry for all entity kinds served by the application
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: IndexMap::new(),
        }
    }

    /// Register an entity descriptor
    ///
    /// The kind's query spec is validated here so a filter or sort key that
    /// reads through an undeclared load path fails at startup.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) -> Result<(), ConfigError> {
        let entity_type = descriptor.entity_type().to_string();
        if self.descriptors.contains_key(&entity_type) {
            return Err(ConfigError::DuplicateEntity { entity_type });
        }
        descriptor.validate()?;

        tracing::debug!(entity = %entity_type, plural = descriptor.plural(), "registered entity");
        self.descriptors.insert(entity_type, descriptor);
        Ok(())
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self, store: &InMemoryStore) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes(store.clone()));
        }

        router
    }

    /// All registered entity types, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    /// Collection path of every registered kind (`/api/{plural}`)
    pub fn collection_paths(&self) -> Vec<String> {
        self.descriptors
            .values()
            .map(|d| format!("/api/{}", d.plural()))
            .collect()
    }
}
