//! Server module for building HTTP servers with auto-registered routes
//!
//! `ServerBuilder` registers entity kinds and produces a router with:
//! - CRUD routes for every registered kind under `/api/{plural}`
//! - health checks
//! - request tracing and optional CORS

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod handlers;

pub use builder::ServerBuilder;
pub use entity_registry::{CrudDescriptor, EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use handlers::{ListResponse, Resource};
