//! Store access traits
//!
//! A session is a scoped handle on the backing store: acquire it per request,
//! drop it when done. Reads and writes never share process-wide mutable state.

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use async_trait::async_trait;

/// Read access to one entity kind
#[async_trait]
pub trait Queryable<E: Entity>: Send + Sync {
    /// Materialise every row, with the given related paths attached
    async fn fetch(&self, includes: &[&'static str]) -> Result<Vec<E>, StoreError>;

    /// Point lookup. A missing row is `Ok(None)`, not an error.
    async fn find(&self, id: i64, includes: &[&'static str]) -> Result<Option<E>, StoreError>;
}

/// Write access to one entity kind
#[async_trait]
pub trait Writable<E: Entity>: Queryable<E> {
    /// Insert a new row; the store assigns the id
    async fn insert(&mut self, entity: E) -> Result<E, StoreError>;

    /// Replace the row with `id`. `Ok(None)` when there is no such row.
    async fn update(&mut self, id: i64, entity: E) -> Result<Option<E>, StoreError>;

    /// Remove the row with `id`. `Ok(false)` when there is no such row.
    async fn delete(&mut self, id: i64) -> Result<bool, StoreError>;
}
