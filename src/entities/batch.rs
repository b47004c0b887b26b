//! Production batches
//!
//! A batch belongs to one product and optionally to one customer. Both can be
//! attached on load; filters and sort keys over their names declare the path
//! they read through.

use super::{Customer, Product};
use crate::core::error::LabResult;
use crate::core::mapping::{
    Mapped, date_from_wire, date_to_wire, merge, merge_nullable, nullable, required,
};
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::storage::{Reference, Stored, Tables, attach_related, split_path};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    pub name: String,
    pub product_id: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    pub production_date: NaiveDateTime,
    pub quantity: i64,
    pub status: bool,

    #[serde(skip)]
    pub product: Option<Product>,
    #[serde(skip)]
    pub customer: Option<Customer>,
}

impl Batch {
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.name.as_str())
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().map(|c| c.name.as_str())
    }
}

crate::impl_lab_entity!(Batch, "batch", "batches");

impl Stored for Batch {
    crate::stored_table!(batches);

    fn references(&self) -> Vec<Reference> {
        let mut refs = vec![Reference::new("product", self.product_id)];
        if let Some(id) = self.customer_id {
            refs.push(Reference::new("customer", id));
        }
        refs
    }

    fn attach(&mut self, path: &str, tables: &Tables) {
        match split_path(path) {
            ("product", rest) => {
                attach_related(&mut self.product, Some(self.product_id), rest, tables)
            }
            ("customer", rest) => attach_related(&mut self.customer, self.customer_id, rest, tables),
            _ => {}
        }
    }

    fn detach(&mut self) {
        self.product = None;
        self.customer = None;
    }
}

crate::impl_query_model!(Batch, || {
    QuerySpec::new("batch")
        .load("product")
        .load("customer")
        .filter(FilterDef::contains("batchName", |b: &Batch| Some(b.name.as_str())))
        .filter(FilterDef::exact("exactBatchName", |b: &Batch| Some(b.name.as_str())))
        .filter(FilterDef::contains("productName", Batch::product_name).requires("product"))
        .filter(FilterDef::contains("customerName", Batch::customer_name).requires("customer"))
        .filter(FilterDef::int("productId", |b: &Batch| Some(b.product_id)))
        .filter(FilterDef::int("customerId", |b: &Batch| b.customer_id))
        .filter(FilterDef::flag("status", |b: &Batch| Some(b.status)))
        .filter(FilterDef::on_day("productionDate", |b: &Batch| Some(b.production_date)))
        .filter(FilterDef::since("productionDateFrom", |b: &Batch| Some(b.production_date)))
        .filter(FilterDef::until("productionDateTo", |b: &Batch| Some(b.production_date)))
        .sort(SortKey::text("name", |b: &Batch| Some(b.name.as_str())))
        .sort(SortKey::by("productionDate", |b: &Batch| b.production_date))
        .sort(SortKey::by("quantity", |b: &Batch| b.quantity))
        .sort(SortKey::text("productName", Batch::product_name).requires("product"))
        .sort(SortKey::text("customerName", Batch::customer_name).requires("customer"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDto {
    pub id: i64,
    pub name: String,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub production_date: String,
    pub quantity: i64,
    pub status: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: Option<Option<i64>>,
    pub production_date: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i64>,
    pub status: Option<bool>,
}

impl Mapped for Batch {
    type Dto = BatchDto;
    type Input = BatchInput;

    fn to_dto(&self) -> BatchDto {
        BatchDto {
            id: self.id,
            name: self.name.clone(),
            product_id: self.product_id,
            product_name: self.product_name().map(str::to_string),
            customer_id: self.customer_id,
            customer_name: self.customer_name().map(str::to_string),
            production_date: date_to_wire(self.production_date),
            quantity: self.quantity,
            status: self.status,
        }
    }

    fn from_input(input: BatchInput) -> LabResult<Self> {
        let production_date = date_from_wire(input.production_date.as_deref())?;
        Ok(Batch {
            id: 0,
            name: required("name", input.name)?,
            product_id: required("productId", input.product_id)?,
            customer_id: input.customer_id.flatten(),
            production_date: required("productionDate", production_date)?,
            quantity: input.quantity.unwrap_or(0),
            status: input.status.unwrap_or(true),
            product: None,
            customer: None,
        })
    }

    fn apply_input(&mut self, input: BatchInput) -> LabResult<()> {
        let production_date = date_from_wire(input.production_date.as_deref())?;
        merge(&mut self.name, input.name);
        merge(&mut self.product_id, input.product_id);
        merge_nullable(&mut self.customer_id, input.customer_id);
        merge(&mut self.production_date, production_date);
        merge(&mut self.quantity, input.quantity);
        merge(&mut self.status, input.status);
        Ok(())
    }
}
