//! Test machines

use crate::core::error::LabResult;
use crate::core::mapping::{
    Mapped, date_opt_to_wire, merge, merge_nullable, merge_opt, nullable, parse_nullable,
    required,
};
use crate::core::query::{FilterDef, QuerySpec, SortKey};
use crate::core::temporal::parse_date;
use crate::storage::Stored;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
    #[serde(default)]
    pub location: Option<String>,
    pub status: bool,
    #[serde(default)]
    pub last_maintenance: Option<NaiveDateTime>,
}

crate::impl_lab_entity!(Machine, "machine", "machines");

impl Stored for Machine {
    crate::stored_table!(machines);
}

crate::impl_query_model!(Machine, || {
    QuerySpec::new("machine")
        .filter(FilterDef::contains("machineName", |m: &Machine| Some(m.name.as_str())))
        .filter(FilterDef::exact("serialNumber", |m: &Machine| Some(m.serial_number.as_str())))
        .filter(FilterDef::contains("location", |m: &Machine| m.location.as_deref()))
        .filter(FilterDef::flag("status", |m: &Machine| Some(m.status)))
        .filter(FilterDef::on_day("lastMaintenanceDate", |m: &Machine| m.last_maintenance))
        .sort(SortKey::text("name", |m: &Machine| Some(m.name.as_str())))
        .sort(SortKey::text("location", |m: &Machine| m.location.as_deref()))
        .sort(SortKey::by("lastMaintenance", |m: &Machine| m.last_maintenance))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDto {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
    pub location: Option<String>,
    pub status: bool,
    pub last_maintenance: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MachineInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub serial_number: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub status: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub last_maintenance: Option<Option<String>>,
}

impl Mapped for Machine {
    type Dto = MachineDto;
    type Input = MachineInput;

    fn to_dto(&self) -> MachineDto {
        MachineDto {
            id: self.id,
            name: self.name.clone(),
            serial_number: self.serial_number.clone(),
            location: self.location.clone(),
            status: self.status,
            last_maintenance: date_opt_to_wire(self.last_maintenance),
        }
    }

    fn from_input(input: MachineInput) -> LabResult<Self> {
        Ok(Machine {
            id: 0,
            name: required("name", input.name)?,
            serial_number: required("serialNumber", input.serial_number)?,
            location: input.location,
            status: input.status.unwrap_or(true),
            last_maintenance: parse_nullable(input.last_maintenance, parse_date)?.flatten(),
        })
    }

    fn apply_input(&mut self, input: MachineInput) -> LabResult<()> {
        let last_maintenance = parse_nullable(input.last_maintenance, parse_date)?;
        merge(&mut self.name, input.name);
        merge(&mut self.serial_number, input.serial_number);
        merge_opt(&mut self.location, input.location);
        merge(&mut self.status, input.status);
        merge_nullable(&mut self.last_maintenance, last_maintenance);
        Ok(())
    }
}
