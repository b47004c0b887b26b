//! Core module containing the query engine, codec and fundamental traits

pub mod entity;
pub mod error;
pub mod mapping;
pub mod query;
pub mod service;
pub mod temporal;

pub use entity::Entity;
pub use error::{ConfigError, EntityError, FormatError, LabError, LabResult, StoreError, ValidationError};
pub use mapping::Mapped;
pub use query::{FilterDef, FilterKind, LoadSpec, QueryExecutor, QueryModel, QueryParams, QueryPlan, QuerySpec, SortKey};
pub use service::{Queryable, Writable};
