//! Typed filter/sort/eager-load queries
//!
//! Every entity kind declares a [`QuerySpec`] once: which related paths can be
//! loaded, which named filters narrow the result, and which named keys order
//! it. [`QueryExecutor`] turns raw request parameters into a plan against that
//! spec and runs it over a [`Queryable`](crate::core::service::Queryable)
//! session.
//!
//! ```text
//! QueryParams ──► LoadSpec::resolve ──► session.fetch(includes)
//!             ──► FilterSet::compile ──► retain matching rows
//!             ──► SortSet::select    ──► order (or leave load order)
//! ```

pub mod executor;
pub mod filter;
pub mod load;
pub mod params;
pub mod sort;
pub mod spec;

pub use executor::{QueryExecutor, QueryPlan};
pub use filter::{CompiledFilter, FilterDef, FilterKind, FilterSet};
pub use load::LoadSpec;
pub use params::QueryParams;
pub use sort::{SortKey, SortSet};
pub use spec::{QueryModel, QuerySpec};
