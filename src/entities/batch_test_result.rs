//! Link between a batch and a test result taken on it
//!
//! Most of what callers filter and sort on lives two hops away (the product
//! and machine of the linked test result), so this kind declares nested
//! load paths.

use super::{Batch, TestResult};
use crate::core::error::LabResult;
use crate::core::mapping::{Mapped, date_opt_to_wire, merge, required};
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::storage::{Reference, Stored, Tables, attach_related, split_path};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTestResult {
    pub id: i64,
    pub batch_id: i64,
    pub test_result_id: i64,

    #[serde(skip)]
    pub batch: Option<Batch>,
    #[serde(skip)]
    pub test_result: Option<TestResult>,
}

impl BatchTestResult {
    pub fn batch_name(&self) -> Option<&str> {
        self.batch.as_ref().map(|b| b.name.as_str())
    }

    pub fn test_name(&self) -> Option<&str> {
        self.test_result.as_ref().map(|t| t.test_name.as_str())
    }

    pub fn product_name(&self) -> Option<&str> {
        self.test_result.as_ref().and_then(TestResult::product_name)
    }

    pub fn machine_name(&self) -> Option<&str> {
        self.test_result.as_ref().and_then(TestResult::machine_name)
    }

    pub fn test_date(&self) -> Option<NaiveDateTime> {
        self.test_result.as_ref().map(|t| t.test_date)
    }

    pub fn passed(&self) -> Option<bool> {
        self.test_result.as_ref().map(|t| t.passed)
    }
}

crate::impl_lab_entity!(BatchTestResult, "batch_test_result", "batch_test_results");

impl Stored for BatchTestResult {
    crate::stored_table!(batch_test_results);

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new("batch", self.batch_id),
            Reference::new("test_result", self.test_result_id),
        ]
    }

    fn attach(&mut self, path: &str, tables: &Tables) {
        match split_path(path) {
            ("batch", rest) => attach_related(&mut self.batch, Some(self.batch_id), rest, tables),
            ("test_result", rest) => {
                attach_related(&mut self.test_result, Some(self.test_result_id), rest, tables)
            }
            _ => {}
        }
    }

    fn detach(&mut self) {
        self.batch = None;
        self.test_result = None;
    }
}

crate::impl_query_model!(BatchTestResult, || {
    QuerySpec::new("batch_test_result")
        .load("batch")
        .load("test_result")
        .load("test_result.product")
        .load("test_result.machine")
        .filter(FilterDef::contains("batchName", BatchTestResult::batch_name).requires("batch"))
        .filter(FilterDef::exact("exactBatchName", BatchTestResult::batch_name).requires("batch"))
        .filter(
            FilterDef::contains("productName", BatchTestResult::product_name)
                .requires("test_result.product"),
        )
        .filter(
            FilterDef::contains("machineName", BatchTestResult::machine_name)
                .requires("test_result.machine"),
        )
        .filter(FilterDef::int("batchId", |r: &BatchTestResult| Some(r.batch_id)))
        .filter(FilterDef::int("testResultId", |r: &BatchTestResult| Some(r.test_result_id)))
        .filter(FilterDef::flag("passed", BatchTestResult::passed).requires("test_result"))
        .filter(FilterDef::on_day("testDate", BatchTestResult::test_date).requires("test_result"))
        .sort(SortKey::text("batchName", BatchTestResult::batch_name).requires("batch"))
        .sort(
            SortKey::text("productName", BatchTestResult::product_name)
                .requires("test_result.product"),
        )
        .sort(
            SortKey::text("machineName", BatchTestResult::machine_name)
                .requires("test_result.machine"),
        )
        .sort(SortKey::by("testDate", BatchTestResult::test_date).requires("test_result"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTestResultDto {
    pub id: i64,
    pub batch_id: i64,
    pub batch_name: Option<String>,
    pub test_result_id: i64,
    pub test_name: Option<String>,
    pub product_name: Option<String>,
    pub machine_name: Option<String>,
    pub test_date: Option<String>,
    pub passed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchTestResultInput {
    #[validate(range(min = 1))]
    pub batch_id: Option<i64>,
    #[validate(range(min = 1))]
    pub test_result_id: Option<i64>,
}

impl Mapped for BatchTestResult {
    type Dto = BatchTestResultDto;
    type Input = BatchTestResultInput;

    fn to_dto(&self) -> BatchTestResultDto {
        BatchTestResultDto {
            id: self.id,
            batch_id: self.batch_id,
            batch_name: self.batch_name().map(str::to_string),
            test_result_id: self.test_result_id,
            test_name: self.test_name().map(str::to_string),
            product_name: self.product_name().map(str::to_string),
            machine_name: self.machine_name().map(str::to_string),
            test_date: date_opt_to_wire(self.test_date()),
            passed: self.passed(),
        }
    }

    fn from_input(input: BatchTestResultInput) -> LabResult<Self> {
        Ok(BatchTestResult {
            id: 0,
            batch_id: required("batchId", input.batch_id)?,
            test_result_id: required("testResultId", input.test_result_id)?,
            batch: None,
            test_result: None,
        })
    }

    fn apply_input(&mut self, input: BatchTestResultInput) -> LabResult<()> {
        merge(&mut self.batch_id, input.batch_id);
        merge(&mut self.test_result_id, input.test_result_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{QueryModel, QueryParams, QueryPlan};

    #[test]
    fn test_product_name_loads_test_result_chain_only() {
        let plan = QueryPlan::<BatchTestResult>::new(&QueryParams::new().filter("productName", "x"));
        assert_eq!(plan.includes(), ["test_result", "test_result.product"]);
    }

    #[test]
    fn test_batch_and_machine_sort() {
        let plan = QueryPlan::<BatchTestResult>::new(
            &QueryParams::new()
                .filter("batchName", "B")
                .sort("machineName", false),
        );
        assert_eq!(
            plan.includes(),
            ["batch", "test_result", "test_result.machine"]
        );
        assert_eq!(plan.sort_key(), Some("machineName"));
    }

    #[test]
    fn test_unrelated_filters_load_nothing() {
        let plan = QueryPlan::<BatchTestResult>::new(&QueryParams::new().filter("batchId", "3"));
        assert!(plan.includes().is_empty());
    }

    #[test]
    fn test_spec_is_valid() {
        assert!(BatchTestResult::query_spec().validate().is_ok());
        assert_eq!(BatchTestResult::query_spec().loads().declared().len(), 4);
    }

    #[test]
    fn test_dto_without_loaded_relations() {
        let link = BatchTestResult {
            id: 1,
            batch_id: 2,
            test_result_id: 3,
            batch: None,
            test_result: None,
        };
        let dto = link.to_dto();
        assert_eq!(dto.batch_name, None);
        assert_eq!(dto.test_date, None);
        assert_eq!(dto.passed, None);
    }
}
