//! In-memory backing store for development and tests
//!
//! All tables live behind one `tokio::sync::RwLock`. A [`Session`] holds an
//! owned read guard and a [`WriteSession`] an owned write guard, so the lock
//! is released when the session is dropped.

use crate::config::StoreConfig;
use crate::core::entity::Entity;
use crate::core::error::{ConfigError, StoreError};
use crate::core::service::{Queryable, Writable};
use crate::entities::{
    Batch, BatchTestResult, Customer, Machine, Product, QcKpi, Report, TestResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

const BACKEND: &str = "in-memory";

/// A foreign key held by a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub entity_type: &'static str,
    pub id: i64,
}

impl Reference {
    pub fn new(entity_type: &'static str, id: i64) -> Self {
        Self { entity_type, id }
    }
}

/// How an entity kind is kept in [`Tables`]
pub trait Stored: Entity {
    fn table(tables: &Tables) -> &BTreeMap<i64, Self>;

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<i64, Self>;

    /// Rows this row points at
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Attach the related rows named by an include path
    fn attach(&mut self, _path: &str, _tables: &Tables) {}

    /// Drop attached related rows before the row is persisted
    fn detach(&mut self) {}
}

/// Generate the `table`/`table_mut` accessors of a [`Stored`] impl
#[macro_export]
macro_rules! stored_table {
    ($field:ident) => {
        fn table(tables: &$crate::storage::Tables) -> &::std::collections::BTreeMap<i64, Self> {
            &tables.$field
        }

        fn table_mut(
            tables: &mut $crate::storage::Tables,
        ) -> &mut ::std::collections::BTreeMap<i64, Self> {
            &mut tables.$field
        }
    };
}

/// Split `a.b.c` into `("a", Some("b.c"))`
pub fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Load `slot` from its table if empty, then continue down `rest`
pub fn attach_related<T: Stored>(
    slot: &mut Option<T>,
    id: Option<i64>,
    rest: Option<&str>,
    tables: &Tables,
) {
    if slot.is_none() {
        *slot = id.and_then(|id| T::table(tables).get(&id).cloned());
    }
    if let (Some(related), Some(rest)) = (slot.as_mut(), rest) {
        related.attach(rest, tables);
    }
}

/// Every persisted row, keyed by id (iteration order is load order)
///
/// Deserialises from a fixture document listing rows per kind:
///
/// ```yaml
/// products:
///   - { id: 1, name: Widget, code: W-1, status: true, created_at: "2024-01-01T00:00:00" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tables {
    #[serde(deserialize_with = "rows")]
    pub products: BTreeMap<i64, Product>,
    #[serde(deserialize_with = "rows")]
    pub machines: BTreeMap<i64, Machine>,
    #[serde(deserialize_with = "rows")]
    pub customers: BTreeMap<i64, Customer>,
    #[serde(deserialize_with = "rows")]
    pub batches: BTreeMap<i64, Batch>,
    #[serde(deserialize_with = "rows")]
    pub test_results: BTreeMap<i64, TestResult>,
    #[serde(deserialize_with = "rows")]
    pub batch_test_results: BTreeMap<i64, BatchTestResult>,
    #[serde(deserialize_with = "rows")]
    pub qc_kpis: BTreeMap<i64, QcKpi>,
    #[serde(deserialize_with = "rows")]
    pub reports: BTreeMap<i64, Report>,
}

fn rows<'de, D, T>(deserializer: D) -> Result<BTreeMap<i64, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Entity,
{
    let list = Vec::<T>::deserialize(deserializer)?;
    let mut map = BTreeMap::new();
    for row in list {
        if map.insert(row.id(), row).is_some() {
            return Err(serde::de::Error::custom(format!(
                "duplicate {} id",
                T::resource_name_singular()
            )));
        }
    }
    Ok(map)
}

impl Tables {
    /// Whether a row of `entity_type` with `id` exists
    pub fn exists(&self, reference: Reference) -> bool {
        let id = &reference.id;
        match reference.entity_type {
            "product" => self.products.contains_key(id),
            "machine" => self.machines.contains_key(id),
            "customer" => self.customers.contains_key(id),
            "batch" => self.batches.contains_key(id),
            "test_result" => self.test_results.contains_key(id),
            "batch_test_result" => self.batch_test_results.contains_key(id),
            "qc_kpi" => self.qc_kpis.contains_key(id),
            "report" => self.reports.contains_key(id),
            _ => false,
        }
    }

    /// The kind of the first row that still points at `target`, if any
    pub fn referenced_by(&self, target: Reference) -> Option<&'static str> {
        fn scan<T: Stored>(table: &BTreeMap<i64, T>, target: Reference) -> Option<&'static str> {
            table
                .values()
                .any(|row| row.references().contains(&target))
                .then(T::resource_name_singular)
        }

        scan(&self.batches, target)
            .or_else(|| scan(&self.test_results, target))
            .or_else(|| scan(&self.batch_test_results, target))
            .or_else(|| scan(&self.qc_kpis, target))
            .or_else(|| scan(&self.reports, target))
    }

    /// Every foreign key in the fixture points at an existing row
    pub fn check_integrity(&self) -> Result<(), StoreError> {
        fn check<T: Stored>(tables: &Tables) -> Result<(), StoreError> {
            T::table(tables)
                .values()
                .try_for_each(|row| check_references(row, tables))
        }

        check::<Batch>(self)?;
        check::<TestResult>(self)?;
        check::<BatchTestResult>(self)?;
        check::<QcKpi>(self)?;
        check::<Report>(self)
    }

    fn load<E: Stored>(&self, row: &E, includes: &[&'static str]) -> E {
        let mut row = row.clone();
        for path in includes {
            row.attach(path, self);
        }
        row
    }

    fn fetch<E: Stored>(&self, includes: &[&'static str]) -> Vec<E> {
        E::table(self)
            .values()
            .map(|row| self.load(row, includes))
            .collect()
    }

    fn find<E: Stored>(&self, id: i64, includes: &[&'static str]) -> Option<E> {
        E::table(self).get(&id).map(|row| self.load(row, includes))
    }
}

fn check_references<E: Stored>(row: &E, tables: &Tables) -> Result<(), StoreError> {
    match row.references().into_iter().find(|r| !tables.exists(*r)) {
        Some(missing) => Err(StoreError::ConstraintViolation {
            entity_type: E::resource_name_singular().to_string(),
            message: format!(
                "{} {} referenced by row {} does not exist",
                missing.entity_type,
                missing.id,
                row.id()
            ),
        }),
        None => Ok(()),
    }
}

/// In-memory store shared by all request handlers
///
/// Cloning is cheap and clones share the same tables.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    available: Arc<AtomicBool>,
    acquire_timeout: Duration,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_tables(Tables::default())
    }

    /// Create a store holding the given rows
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Arc::new(RwLock::new(tables)),
            available: Arc::new(AtomicBool::new(true)),
            acquire_timeout: Duration::from_millis(StoreConfig::default().acquire_timeout_ms),
        }
    }

    /// Create a store from configuration, seeding fixtures when a path is set
    pub fn from_config(config: &StoreConfig) -> Result<Self, ConfigError> {
        let store = match &config.fixtures {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.clone(),
                    })?;
                Self::from_fixture_str(&content, Some(path))?
            }
            None => Self::new(),
        };
        Ok(store.with_acquire_timeout(Duration::from_millis(config.acquire_timeout_ms)))
    }

    /// Create a store from a YAML fixture document
    pub fn from_fixture_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_fixture_str(yaml, None)
    }

    fn from_fixture_str(content: &str, file: Option<&str>) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::ParseError {
            file: file.map(str::to_string),
            message,
        };
        let tables: Tables =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        tables
            .check_integrity()
            .map_err(|e| parse_error(e.to_string()))?;

        tracing::info!(
            products = tables.products.len(),
            batches = tables.batches.len(),
            test_results = tables.test_results.len(),
            "loaded fixtures"
        );
        Ok(Self::with_tables(tables))
    }

    /// Bound on how long session acquisition may wait for the lock
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Simulate the store going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable {
                backend: BACKEND.to_string(),
            })
        }
    }

    fn timeout_error(&self, operation: &str) -> StoreError {
        StoreError::Timeout {
            operation: operation.to_string(),
            after_ms: self.acquire_timeout.as_millis() as u64,
        }
    }

    /// Open a read session
    pub async fn session(&self) -> Result<Session, StoreError> {
        self.ensure_available()?;
        let guard = tokio::time::timeout(self.acquire_timeout, self.tables.clone().read_owned())
            .await
            .map_err(|_| self.timeout_error("read session"))?;
        Ok(Session { tables: guard })
    }

    /// Open a write session
    pub async fn write_session(&self) -> Result<WriteSession, StoreError> {
        self.ensure_available()?;
        let guard = tokio::time::timeout(self.acquire_timeout, self.tables.clone().write_owned())
            .await
            .map_err(|_| self.timeout_error("write session"))?;
        Ok(WriteSession { tables: guard })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped read access; the read lock is held until drop
pub struct Session {
    tables: OwnedRwLockReadGuard<Tables>,
}

/// Scoped write access; the write lock is held until drop
pub struct WriteSession {
    tables: OwnedRwLockWriteGuard<Tables>,
}

#[async_trait]
impl<E: Stored> Queryable<E> for Session {
    async fn fetch(&self, includes: &[&'static str]) -> Result<Vec<E>, StoreError> {
        Ok(self.tables.fetch(includes))
    }

    async fn find(&self, id: i64, includes: &[&'static str]) -> Result<Option<E>, StoreError> {
        Ok(self.tables.find(id, includes))
    }
}

#[async_trait]
impl<E: Stored> Queryable<E> for WriteSession {
    async fn fetch(&self, includes: &[&'static str]) -> Result<Vec<E>, StoreError> {
        Ok(self.tables.fetch(includes))
    }

    async fn find(&self, id: i64, includes: &[&'static str]) -> Result<Option<E>, StoreError> {
        Ok(self.tables.find(id, includes))
    }
}

#[async_trait]
impl<E: Stored> Writable<E> for WriteSession {
    async fn insert(&mut self, mut entity: E) -> Result<E, StoreError> {
        entity.detach();
        check_references(&entity, &self.tables)?;

        let table = E::table_mut(&mut self.tables);
        let id = match table.keys().next_back() {
            None => 1,
            Some(last) => last.checked_add(1).ok_or_else(|| StoreError::ConstraintViolation {
                entity_type: E::resource_name_singular().to_string(),
                message: format!("no id left after {}", last),
            })?,
        };
        entity.set_id(id);
        table.insert(id, entity.clone());

        tracing::debug!(entity = E::resource_name_singular(), id, "inserted");
        Ok(entity)
    }

    async fn update(&mut self, id: i64, mut entity: E) -> Result<Option<E>, StoreError> {
        if !E::table(&self.tables).contains_key(&id) {
            return Ok(None);
        }
        entity.detach();
        entity.set_id(id);
        check_references(&entity, &self.tables)?;

        E::table_mut(&mut self.tables).insert(id, entity.clone());

        tracing::debug!(entity = E::resource_name_singular(), id, "updated");
        Ok(Some(entity))
    }

    async fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        if !E::table(&self.tables).contains_key(&id) {
            return Ok(false);
        }
        let target = Reference::new(E::resource_name_singular(), id);
        if let Some(referrer) = self.tables.referenced_by(target) {
            return Err(StoreError::ConstraintViolation {
                entity_type: E::resource_name_singular().to_string(),
                message: format!("row {} is still referenced by a {}", id, referrer),
            });
        }

        E::table_mut(&mut self.tables).remove(&id);

        tracing::debug!(entity = E::resource_name_singular(), id, "deleted");
        Ok(true)
    }
}
