//! Per-entity query configuration

use super::filter::{FilterDef, FilterSet};
use super::load::LoadSpec;
use super::sort::{SortKey, SortSet};
use crate::core::entity::Entity;
use crate::core::error::ConfigError;

/// Filter, sort and load tables for one entity kind
///
/// Built once per kind and shared read-only by every query.
///
/// # Example
///
/// ```rust,ignore
/// QuerySpec::new("batch")
///     .load("product")
///     .filter(FilterDef::contains("batchName", |b: &Batch| Some(b.name.as_str())))
///     .filter(FilterDef::exact("exactBatchName", |b: &Batch| Some(b.name.as_str())))
///     .filter(
///         FilterDef::contains("productName", |b: &Batch| {
///             b.product.as_ref().map(|p| p.name.as_str())
///         })
///         .requires("product"),
///     )
///     .sort(SortKey::by("productionDate", |b: &Batch| b.production_date))
/// ```
#[derive(Debug)]
pub struct QuerySpec<E> {
    entity_type: &'static str,
    loads: LoadSpec,
    filters: FilterSet<E>,
    sorts: SortSet<E>,
}

impl<E: 'static> QuerySpec<E> {
    pub fn new(entity_type: &'static str) -> Self {
        Self {
            entity_type,
            loads: LoadSpec::new(),
            filters: FilterSet::new(),
            sorts: SortSet::new(),
        }
    }

    pub fn load(mut self, path: &'static str) -> Self {
        self.loads = self.loads.path(path);
        self
    }

    pub fn filter(mut self, def: FilterDef<E>) -> Self {
        self.filters.insert(def);
        self
    }

    pub fn sort(mut self, key: SortKey<E>) -> Self {
        self.sorts.insert(key);
        self
    }

    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    pub fn loads(&self) -> &LoadSpec {
        &self.loads
    }

    pub fn filters(&self) -> &FilterSet<E> {
        &self.filters
    }

    pub fn sorts(&self) -> &SortSet<E> {
        &self.sorts
    }

    /// Every filter and sort key may only require declared load paths
    pub fn validate(&self) -> Result<(), ConfigError> {
        let filter_paths = self
            .filters
            .iter()
            .flat_map(|f| f.required_paths().iter().map(move |p| (f.name(), *p)));
        let sort_paths = self
            .sorts
            .iter()
            .flat_map(|s| s.required_paths().iter().map(move |p| (s.name(), *p)));

        for (name, path) in filter_paths.chain(sort_paths) {
            if !self.loads.contains(path) {
                return Err(ConfigError::UndeclaredLoadPath {
                    entity_type: self.entity_type.to_string(),
                    name: name.to_string(),
                    path: path.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// An entity kind with a static query spec
pub trait QueryModel: Entity {
    fn query_spec() -> &'static QuerySpec<Self>;
}
