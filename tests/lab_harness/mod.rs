//! Shared test harness for lab integration tests
//!
//! Seeds an [`InMemoryStore`] from the demo fixtures, so tests and the demo
//! binary see the same data.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod lab_harness;
//! use lab_harness::*;
//! ```

#![allow(dead_code)]

use labqc::prelude::*;

/// The demo fixture document
///
/// - products: 1 Epoxy Resin, 2 Epoxy Resin XL, 3 Primer (inactive)
/// - customers: 1 Acme Corp, 2 ACME Labs (inactive), 3 Globex
/// - batches: 1 Batch-001, 2 Batch-001-R (both product 1 / Acme Corp),
///   3 Batch-002 (product 2 / Globex, status false), 4 Batch-003 (product 3, no customer)
/// - batch test results: 1 -> test 1 (Tensile Tester), 2 -> test 2 (Viscometer),
///   3 -> test 3 (product 2, Tensile Tester)
pub const FIXTURES: &str = include_str!("../../demos/lab_api/fixtures.yaml");

pub fn seeded_store() -> InMemoryStore {
    InMemoryStore::from_fixture_yaml(FIXTURES).expect("demo fixtures should load")
}

pub fn lab_router(store: InMemoryStore) -> Router {
    ServerBuilder::new(store)
        .register_lab_entities()
        .expect("lab entities should register")
        .build()
}

pub fn ids<E: Entity>(rows: &[E]) -> Vec<i64> {
    rows.iter().map(Entity::id).collect()
}

/// Values of `field` across the `items` of a list response
pub fn field_values(body: &serde_json::Value, field: &str) -> Vec<serde_json::Value> {
    body["items"]
        .as_array()
        .expect("list response should carry items")
        .iter()
        .map(|item| item[field].clone())
        .collect()
}
