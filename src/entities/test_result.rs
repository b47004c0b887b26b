//! Individual test measurements taken on a machine for a product

use super::{Machine, Product};
use crate::core::error::LabResult;
use crate::core::mapping::{
    Mapped, date_from_wire, date_to_wire, duration_opt_to_wire, merge, merge_nullable, merge_opt,
    nullable, parse_nullable, required,
};
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::core::temporal::parse_duration;
use crate::storage::{Reference, Stored, Tables, attach_related, split_path};
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub product_id: i64,
    pub machine_id: i64,
    pub test_name: String,
    pub test_date: NaiveDateTime,
    #[serde(default, with = "crate::core::temporal::duration_opt")]
    pub duration: Option<TimeDelta>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    pub passed: bool,
    #[serde(default)]
    pub operator: Option<String>,

    #[serde(skip)]
    pub product: Option<Product>,
    #[serde(skip)]
    pub machine: Option<Machine>,
}

impl TestResult {
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.name.as_str())
    }

    pub fn machine_name(&self) -> Option<&str> {
        self.machine.as_ref().map(|m| m.name.as_str())
    }
}

crate::impl_lab_entity!(TestResult, "test_result", "test_results");

impl Stored for TestResult {
    crate::stored_table!(test_results);

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new("product", self.product_id),
            Reference::new("machine", self.machine_id),
        ]
    }

    fn attach(&mut self, path: &str, tables: &Tables) {
        match split_path(path) {
            ("product", rest) => {
                attach_related(&mut self.product, Some(self.product_id), rest, tables)
            }
            ("machine", rest) => {
                attach_related(&mut self.machine, Some(self.machine_id), rest, tables)
            }
            _ => {}
        }
    }

    fn detach(&mut self) {
        self.product = None;
        self.machine = None;
    }
}

crate::impl_query_model!(TestResult, || {
    QuerySpec::new("test_result")
        .load("product")
        .load("machine")
        .filter(FilterDef::contains("testName", |t: &TestResult| Some(t.test_name.as_str())))
        .filter(FilterDef::contains("productName", TestResult::product_name).requires("product"))
        .filter(FilterDef::contains("machineName", TestResult::machine_name).requires("machine"))
        .filter(FilterDef::int("productId", |t: &TestResult| Some(t.product_id)))
        .filter(FilterDef::int("machineId", |t: &TestResult| Some(t.machine_id)))
        .filter(FilterDef::flag("passed", |t: &TestResult| Some(t.passed)))
        .filter(FilterDef::on_day("testDate", |t: &TestResult| Some(t.test_date)))
        .filter(FilterDef::contains("operator", |t: &TestResult| t.operator.as_deref()))
        .sort(SortKey::by("testDate", |t: &TestResult| t.test_date))
        .sort(SortKey::by("duration", |t: &TestResult| t.duration))
        .sort(SortKey::float("value", |t: &TestResult| t.value))
        .sort(SortKey::text("testName", |t: &TestResult| Some(t.test_name.as_str())))
        .sort(SortKey::text("productName", TestResult::product_name).requires("product"))
        .sort(SortKey::text("machineName", TestResult::machine_name).requires("machine"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultDto {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub machine_id: i64,
    pub machine_name: Option<String>,
    pub test_name: String,
    pub test_date: String,
    pub duration: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub passed: bool,
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestResultInput {
    #[validate(range(min = 1))]
    pub product_id: Option<i64>,
    #[validate(range(min = 1))]
    pub machine_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub test_name: Option<String>,
    pub test_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub duration: Option<Option<String>>,
    pub value: Option<f64>,
    #[validate(length(max = 20))]
    pub unit: Option<String>,
    pub passed: Option<bool>,
    #[validate(length(max = 100))]
    pub operator: Option<String>,
}

impl Mapped for TestResult {
    type Dto = TestResultDto;
    type Input = TestResultInput;

    fn to_dto(&self) -> TestResultDto {
        TestResultDto {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name().map(str::to_string),
            machine_id: self.machine_id,
            machine_name: self.machine_name().map(str::to_string),
            test_name: self.test_name.clone(),
            test_date: date_to_wire(self.test_date),
            duration: duration_opt_to_wire(self.duration),
            value: self.value,
            unit: self.unit.clone(),
            passed: self.passed,
            operator: self.operator.clone(),
        }
    }

    fn from_input(input: TestResultInput) -> LabResult<Self> {
        let test_date = date_from_wire(input.test_date.as_deref())?;
        let duration = parse_nullable(input.duration, parse_duration)?.flatten();
        Ok(TestResult {
            id: 0,
            product_id: required("productId", input.product_id)?,
            machine_id: required("machineId", input.machine_id)?,
            test_name: required("testName", input.test_name)?,
            test_date: required("testDate", test_date)?,
            duration,
            value: input.value,
            unit: input.unit,
            passed: input.passed.unwrap_or(false),
            operator: input.operator,
            product: None,
            machine: None,
        })
    }

    fn apply_input(&mut self, input: TestResultInput) -> LabResult<()> {
        let test_date = date_from_wire(input.test_date.as_deref())?;
        let duration = parse_nullable(input.duration, parse_duration)?;
        merge(&mut self.product_id, input.product_id);
        merge(&mut self.machine_id, input.machine_id);
        merge(&mut self.test_name, input.test_name);
        merge(&mut self.test_date, test_date);
        merge_nullable(&mut self.duration, duration);
        merge_opt(&mut self.value, input.value);
        merge_opt(&mut self.unit, input.unit);
        merge(&mut self.passed, input.passed);
        merge_opt(&mut self.operator, input.operator);
        Ok(())
    }
}
