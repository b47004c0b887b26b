//! Customers batches are produced for

use crate::core::error::LabResult;
use crate::core::mapping::{Mapped, merge, merge_opt, required};
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::storage::Stored;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub is_active: bool,
}

crate::impl_lab_entity!(Customer, "customer", "customers");

impl Stored for Customer {
    crate::stored_table!(customers);
}

crate::impl_query_model!(Customer, || {
    QuerySpec::new("customer")
        .filter(FilterDef::contains("customerName", |c: &Customer| Some(c.name.as_str())))
        .filter(FilterDef::exact("exactCustomerName", |c: &Customer| Some(c.name.as_str())))
        .filter(FilterDef::contains("email", |c: &Customer| Some(c.email.as_str())))
        .filter(FilterDef::flag("isActive", |c: &Customer| Some(c.is_active)))
        .sort(SortKey::text("name", |c: &Customer| Some(c.name.as_str())))
        .sort(SortKey::text("email", |c: &Customer| Some(c.email.as_str())))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl Mapped for Customer {
    type Dto = CustomerDto;
    type Input = CustomerInput;

    fn to_dto(&self) -> CustomerDto {
        CustomerDto {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            is_active: self.is_active,
        }
    }

    fn from_input(input: CustomerInput) -> LabResult<Self> {
        Ok(Customer {
            id: 0,
            name: required("name", input.name)?,
            email: required("email", input.email)?,
            phone: input.phone,
            address: input.address,
            is_active: input.is_active.unwrap_or(true),
        })
    }

    fn apply_input(&mut self, input: CustomerInput) -> LabResult<()> {
        merge(&mut self.name, input.name);
        merge(&mut self.email, input.email);
        merge_opt(&mut self.phone, input.phone);
        merge_opt(&mut self.address, input.address);
        merge(&mut self.is_active, input.is_active);
        Ok(())
    }
}
