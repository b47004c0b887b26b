//! # labqc
//!
//! Backend for a laboratory quality-control system: products, machines,
//! customers, production batches, test results, KPIs and reports, served
//! over a REST API.
//!
//! ## Features
//!
//! - **Typed list queries**: every entity kind declares its named filters,
//!   sort keys and eager-load paths once; request parameters are resolved
//!   against that declaration
//! - **Lenient query input**: absent or malformed filter values and unknown
//!   sort keys never fail a request
//! - **Minimal eager loading**: only the related paths a query actually
//!   reads through are loaded
//! - **Strict temporal codec**: durations as `HH:MM:SS`, timestamps as
//!   `dd/MM/yyyy HH:mm`
//! - **Typed errors**: store failures always reach the caller
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use labqc::prelude::*;
//!
//! let store = InMemoryStore::from_fixture_yaml(FIXTURES)?;
//! let session = store.session().await?;
//!
//! let params = QueryParams::new()
//!     .filter("customerName", "acme")
//!     .sort("productionDate", false);
//! let batches: Vec<Batch> = QueryExecutor::execute(&session, &params).await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod logging;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::Entity,
        mapping::Mapped,
        service::{Queryable, Writable},
    };

    // === Query engine ===
    pub use crate::core::query::{
        FilterDef, FilterKind, LoadSpec, QueryExecutor, QueryModel, QueryParams, QueryPlan,
        QuerySpec, SortKey,
    };

    // === Temporal codec ===
    pub use crate::core::temporal::{format_date, format_duration, parse_date, parse_duration};

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, EntityError, FormatError, LabError, LabResult, StoreError, ValidationError,
    };

    // === Entities ===
    pub use crate::entities::{
        Batch, BatchTestResult, Customer, Machine, Product, QcKpi, Report, TestResult,
    };

    // === Macros ===
    pub use crate::{impl_lab_entity, impl_query_model, stored_table};

    // === Storage ===
    pub use crate::storage::{InMemoryStore, Session, Stored, Tables, WriteSession};

    // === Config ===
    pub use crate::config::{LabConfig, LoggingConfig, ServerConfig, StoreConfig};
    pub use crate::logging::init_logging;

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, Resource, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{NaiveDateTime, TimeDelta};
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        routing::{delete, get, post, put},
    };
}
