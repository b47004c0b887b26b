//! Quality-control KPIs tracked per reporting period

use super::Product;
use crate::core::error::LabResult;
use crate::core::mapping::{
    Mapped, date_from_wire, date_opt_to_wire, date_to_wire, merge, merge_nullable, nullable,
    parse_nullable, required,
};
use crate::core::temporal::parse_date;
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::storage::{Reference, Stored, Tables, attach_related, split_path};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcKpi {
    pub id: i64,
    #[serde(default)]
    pub product_id: Option<i64>,
    pub kpi_name: String,
    pub target_value: f64,
    pub actual_value: f64,
    #[serde(default = "default_higher_is_better")]
    pub higher_is_better: bool,
    pub period_start: NaiveDateTime,
    #[serde(default)]
    pub period_end: Option<NaiveDateTime>,

    #[serde(skip)]
    pub product: Option<Product>,
}

fn default_higher_is_better() -> bool {
    true
}

impl QcKpi {
    /// Whether the actual value meets the target in the KPI's direction
    pub fn within_target(&self) -> bool {
        if self.higher_is_better {
            self.actual_value >= self.target_value
        } else {
            self.actual_value <= self.target_value
        }
    }

    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.name.as_str())
    }
}

crate::impl_lab_entity!(QcKpi, "qc_kpi", "qc_kpis");

impl Stored for QcKpi {
    crate::stored_table!(qc_kpis);

    fn references(&self) -> Vec<Reference> {
        self.product_id
            .map(|id| Reference::new("product", id))
            .into_iter()
            .collect()
    }

    fn attach(&mut self, path: &str, tables: &Tables) {
        if let ("product", rest) = split_path(path) {
            attach_related(&mut self.product, self.product_id, rest, tables);
        }
    }

    fn detach(&mut self) {
        self.product = None;
    }
}

crate::impl_query_model!(QcKpi, || {
    QuerySpec::new("qc_kpi")
        .load("product")
        .filter(FilterDef::contains("kpiName", |k: &QcKpi| Some(k.kpi_name.as_str())))
        .filter(FilterDef::contains("productName", QcKpi::product_name).requires("product"))
        .filter(FilterDef::int("productId", |k: &QcKpi| k.product_id))
        .filter(FilterDef::flag("withinTarget", |k: &QcKpi| Some(k.within_target())))
        .filter(FilterDef::on_day("periodStart", |k: &QcKpi| Some(k.period_start)))
        .sort(SortKey::text("kpiName", |k: &QcKpi| Some(k.kpi_name.as_str())))
        .sort(SortKey::float("actualValue", |k: &QcKpi| Some(k.actual_value)))
        .sort(SortKey::float("targetValue", |k: &QcKpi| Some(k.target_value)))
        .sort(SortKey::by("periodStart", |k: &QcKpi| k.period_start))
        .sort(SortKey::text("productName", QcKpi::product_name).requires("product"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcKpiDto {
    pub id: i64,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub kpi_name: String,
    pub target_value: f64,
    pub actual_value: f64,
    pub higher_is_better: bool,
    pub within_target: bool,
    pub period_start: String,
    pub period_end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QcKpiInput {
    #[serde(default, deserialize_with = "nullable")]
    pub product_id: Option<Option<i64>>,
    #[validate(length(min = 1, max = 100))]
    pub kpi_name: Option<String>,
    pub target_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub higher_is_better: Option<bool>,
    pub period_start: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub period_end: Option<Option<String>>,
}

impl Mapped for QcKpi {
    type Dto = QcKpiDto;
    type Input = QcKpiInput;

    fn to_dto(&self) -> QcKpiDto {
        QcKpiDto {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name().map(str::to_string),
            kpi_name: self.kpi_name.clone(),
            target_value: self.target_value,
            actual_value: self.actual_value,
            higher_is_better: self.higher_is_better,
            within_target: self.within_target(),
            period_start: date_to_wire(self.period_start),
            period_end: date_opt_to_wire(self.period_end),
        }
    }

    fn from_input(input: QcKpiInput) -> LabResult<Self> {
        let period_start = date_from_wire(input.period_start.as_deref())?;
        let period_end = parse_nullable(input.period_end, parse_date)?.flatten();
        Ok(QcKpi {
            id: 0,
            product_id: input.product_id.flatten(),
            kpi_name: required("kpiName", input.kpi_name)?,
            target_value: required("targetValue", input.target_value)?,
            actual_value: required("actualValue", input.actual_value)?,
            higher_is_better: input.higher_is_better.unwrap_or(true),
            period_start: required("periodStart", period_start)?,
            period_end,
            product: None,
        })
    }

    fn apply_input(&mut self, input: QcKpiInput) -> LabResult<()> {
        let period_start = date_from_wire(input.period_start.as_deref())?;
        let period_end = parse_nullable(input.period_end, parse_date)?;
        merge_nullable(&mut self.product_id, input.product_id);
        merge(&mut self.kpi_name, input.kpi_name);
        merge(&mut self.target_value, input.target_value);
        merge(&mut self.actual_value, input.actual_value);
        merge(&mut self.higher_is_better, input.higher_is_better);
        merge(&mut self.period_start, period_start);
        merge_nullable(&mut self.period_end, period_end);
        Ok(())
    }
}
