//! Products under test

use crate::core::error::LabResult;
use crate::core::mapping::{Mapped, date_to_wire, merge, merge_opt, required};
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::storage::Stored;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: bool,
    pub created_at: NaiveDateTime,
}

crate::impl_lab_entity!(Product, "product", "products");

impl Stored for Product {
    crate::stored_table!(products);
}

crate::impl_query_model!(Product, || {
    QuerySpec::new("product")
        .filter(FilterDef::contains("productName", |p: &Product| Some(p.name.as_str())))
        .filter(FilterDef::exact("exactProductName", |p: &Product| Some(p.name.as_str())))
        .filter(FilterDef::contains("code", |p: &Product| Some(p.code.as_str())))
        .filter(FilterDef::flag("status", |p: &Product| Some(p.status)))
        .sort(SortKey::text("name", |p: &Product| Some(p.name.as_str())))
        .sort(SortKey::text("code", |p: &Product| Some(p.code.as_str())))
        .sort(SortKey::by("createdAt", |p: &Product| p.created_at))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub status: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub status: Option<bool>,
}

impl Mapped for Product {
    type Dto = ProductDto;
    type Input = ProductInput;

    fn to_dto(&self) -> ProductDto {
        ProductDto {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            description: self.description.clone(),
            status: self.status,
            created_at: date_to_wire(self.created_at),
        }
    }

    fn from_input(input: ProductInput) -> LabResult<Self> {
        Ok(Product {
            id: 0,
            name: required("name", input.name)?,
            code: required("code", input.code)?,
            description: input.description,
            status: input.status.unwrap_or(true),
            created_at: Utc::now().naive_utc(),
        })
    }

    fn apply_input(&mut self, input: ProductInput) -> LabResult<()> {
        merge(&mut self.name, input.name);
        merge(&mut self.code, input.code);
        merge_opt(&mut self.description, input.description);
        merge(&mut self.status, input.status);
        Ok(())
    }
}
