//! Certificates and QC reports issued to customers

use super::{Batch, Customer};
use crate::core::error::LabResult;
use crate::core::mapping::{
    Mapped, date_to_wire, merge, merge_nullable, merge_opt, nullable, required,
};
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::storage::{Reference, Stored, Tables, attach_related, split_path};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub batch_id: Option<i64>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub generated_by: Option<String>,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(skip)]
    pub batch: Option<Batch>,
    #[serde(skip)]
    pub customer: Option<Customer>,
}

impl Report {
    pub fn batch_name(&self) -> Option<&str> {
        self.batch.as_ref().map(|b| b.name.as_str())
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().map(|c| c.name.as_str())
    }
}

crate::impl_lab_entity!(Report, "report", "reports");

impl Stored for Report {
    crate::stored_table!(reports);

    fn references(&self) -> Vec<Reference> {
        let batch = self.batch_id.map(|id| Reference::new("batch", id));
        let customer = self.customer_id.map(|id| Reference::new("customer", id));
        batch.into_iter().chain(customer).collect()
    }

    fn attach(&mut self, path: &str, tables: &Tables) {
        match split_path(path) {
            ("batch", rest) => attach_related(&mut self.batch, self.batch_id, rest, tables),
            ("customer", rest) => attach_related(&mut self.customer, self.customer_id, rest, tables),
            _ => {}
        }
    }

    fn detach(&mut self) {
        self.batch = None;
        self.customer = None;
    }
}

crate::impl_query_model!(Report, || {
    QuerySpec::new("report")
        .load("batch")
        .load("customer")
        .filter(FilterDef::contains("title", |r: &Report| Some(r.title.as_str())))
        .filter(FilterDef::contains("batchName", Report::batch_name).requires("batch"))
        .filter(FilterDef::exact("exactBatchName", Report::batch_name).requires("batch"))
        .filter(FilterDef::contains("customerName", Report::customer_name).requires("customer"))
        .filter(FilterDef::flag("isFinal", |r: &Report| Some(r.is_final)))
        .filter(FilterDef::on_day("createdDate", |r: &Report| Some(r.created_at)))
        .filter(FilterDef::contains("generatedBy", |r: &Report| r.generated_by.as_deref()))
        .sort(SortKey::text("title", |r: &Report| Some(r.title.as_str())))
        .sort(SortKey::by("createdAt", |r: &Report| r.created_at))
        .sort(SortKey::text("customerName", Report::customer_name).requires("customer"))
        .sort(SortKey::text("batchName", Report::batch_name).requires("batch"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    pub id: i64,
    pub title: String,
    pub batch_id: Option<i64>,
    pub batch_name: Option<String>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub created_at: String,
    pub generated_by: Option<String>,
    pub is_final: bool,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub batch_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: Option<Option<i64>>,
    #[validate(length(max = 100))]
    pub generated_by: Option<String>,
    pub is_final: Option<bool>,
    #[validate(length(max = 4000))]
    pub summary: Option<String>,
}

impl Mapped for Report {
    type Dto = ReportDto;
    type Input = ReportInput;

    fn to_dto(&self) -> ReportDto {
        ReportDto {
            id: self.id,
            title: self.title.clone(),
            batch_id: self.batch_id,
            batch_name: self.batch_name().map(str::to_string),
            customer_id: self.customer_id,
            customer_name: self.customer_name().map(str::to_string),
            created_at: date_to_wire(self.created_at),
            generated_by: self.generated_by.clone(),
            is_final: self.is_final,
            summary: self.summary.clone(),
        }
    }

    fn from_input(input: ReportInput) -> LabResult<Self> {
        Ok(Report {
            id: 0,
            title: required("title", input.title)?,
            batch_id: input.batch_id.flatten(),
            customer_id: input.customer_id.flatten(),
            created_at: Utc::now().naive_utc(),
            generated_by: input.generated_by,
            is_final: input.is_final.unwrap_or(false),
            summary: input.summary,
            batch: None,
            customer: None,
        })
    }

    fn apply_input(&mut self, input: ReportInput) -> LabResult<()> {
        merge(&mut self.title, input.title);
        merge_nullable(&mut self.batch_id, input.batch_id);
        merge_nullable(&mut self.customer_id, input.customer_id);
        merge_opt(&mut self.generated_by, input.generated_by);
        merge(&mut self.is_final, input.is_final);
        merge_opt(&mut self.summary, input.summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{QueryModel, QueryParams, QueryPlan};
    use chrono::NaiveDate;

    fn report(id: i64, title: &str, customer: Option<&str>) -> Report {
        Report {
            id,
            title: title.to_string(),
            batch_id: None,
            customer_id: customer.map(|_| 1),
            created_at: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            generated_by: None,
            is_final: false,
            summary: None,
            batch: None,
            customer: customer.map(|name| Customer {
                id: 1,
                name: name.to_string(),
                email: "qa@example.com".to_string(),
                phone: None,
                address: None,
                is_active: true,
            }),
        }
    }

    #[test]
    fn test_sort_by_customer_name_nulls_first() {
        let rows = vec![
            report(1, "A", Some("Zenith")),
            report(2, "B", None),
            report(3, "C", Some("Acme")),
        ];
        let plan = QueryPlan::<Report>::new(&QueryParams::new().sort("customerName", true));
        assert_eq!(plan.includes(), ["customer"]);
        let out = plan.apply(rows);
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn test_created_date_filter() {
        let rows = vec![report(1, "A", None)];
        let hit = QueryPlan::<Report>::new(&QueryParams::new().filter("createdDate", "1/2/2024"));
        assert_eq!(hit.apply(rows.clone()).len(), 1);
        let miss = QueryPlan::<Report>::new(&QueryParams::new().filter("createdDate", "2/2/2024"));
        assert!(miss.apply(rows).is_empty());
    }

    #[test]
    fn test_references() {
        let mut r = report(1, "A", None);
        assert!(r.references().is_empty());
        r.batch_id = Some(4);
        r.customer_id = Some(2);
        assert_eq!(
            r.references(),
            vec![Reference::new("batch", 4), Reference::new("customer", 2)]
        );
    }

    #[test]
    fn test_spec_is_valid() {
        assert!(Report::query_spec().validate().is_ok());
    }
}
