//! Domain ↔ DTO mapping
//!
//! Read DTOs carry temporal fields as display strings; write inputs carry them
//! as strings too and are parsed strictly. An input field that is absent
//! leaves the model field untouched; a present but malformed one is a
//! [`FormatError`]. Nullable references and optional timestamps/durations are
//! read through [`nullable`], so an explicit `null` clears them.

use crate::core::entity::Entity;
use crate::core::error::{FormatError, LabResult, ValidationError};
use crate::core::temporal::{format_date, format_duration, parse_date};
use chrono::{NaiveDateTime, TimeDelta};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// An entity kind with a wire representation
pub trait Mapped: Entity {
    /// Response body
    type Dto: Serialize + Send;

    /// Create/update request body
    type Input: DeserializeOwned + Validate + Send;

    fn to_dto(&self) -> Self::Dto;

    /// Build a new entity from a create request (id assigned by the store)
    fn from_input(input: Self::Input) -> LabResult<Self>;

    /// Apply the fields present in an update request
    fn apply_input(&mut self, input: Self::Input) -> LabResult<()>;
}

/// Unwrap a field that a create request must carry
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField {
        field: field.to_string(),
    })
}

pub fn date_to_wire(value: NaiveDateTime) -> String {
    format_date(value)
}

pub fn date_opt_to_wire(value: Option<NaiveDateTime>) -> Option<String> {
    value.map(format_date)
}

pub fn duration_opt_to_wire(value: Option<TimeDelta>) -> Option<String> {
    value.map(format_duration)
}

/// Parse an optional wire timestamp; `None` stays `None`
pub fn date_from_wire(value: Option<&str>) -> Result<Option<NaiveDateTime>, FormatError> {
    value.map(parse_date).transpose()
}

/// Overwrite `target` when the update carries a value
pub fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Overwrite an optional `target` when the update carries a value
pub fn merge_opt<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

/// Deserialize a field that distinguishes "absent" from an explicit `null`
///
/// Pair with `#[serde(default)]`: an absent key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse a [`nullable`] temporal field, keeping its absent/null/value shape
pub fn parse_nullable<T, F>(
    value: Option<Option<String>>,
    parse: F,
) -> Result<Option<Option<T>>, FormatError>
where
    F: Fn(&str) -> Result<T, FormatError>,
{
    value.map(|v| v.as_deref().map(&parse).transpose()).transpose()
}

/// Apply a [`nullable`] field: absent keeps `target`, `null` clears it
pub fn merge_nullable<T>(target: &mut Option<T>, value: Option<Option<T>>) {
    if let Some(value) = value {
        *target = value;
    }
}
