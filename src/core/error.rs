//! Typed error handling for labqc
//!
//! Two failure classes are kept apart on purpose:
//!
//! - malformed query input (a filter value that does not parse, an unknown
//!   sort key) is never an error; the query engine just skips it;
//! - backing-store failures and malformed temporal values on writes are
//!   typed errors that propagate to the caller.
//!
//! # Error Categories
//!
//! - [`EntityError`]: point lookups that find no row
//! - [`StoreError`]: backing-store access (connectivity, timeout, constraints)
//! - [`FormatError`]: temporal values that do not parse
//! - [`ValidationError`]: write payloads rejected before reaching the store
//! - [`ConfigError`]: configuration and query-spec registration problems
//!
//! # Example
//!
//! ```rust,ignore
//! use labqc::prelude::*;
//!
//! match session.find(id, &[]).await {
//!     Ok(Some(batch)) => println!("{}", batch.name),
//!     Ok(None) => println!("no batch {}", id),
//!     Err(e) => return Err(LabError::Store(e)),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for labqc
#[derive(Debug)]
pub enum LabError {
    /// Entity-related errors (point lookups)
    Entity(EntityError),

    /// Backing-store errors
    Store(StoreError),

    /// Temporal transcoding errors
    Format(FormatError),

    /// Input validation errors
    Validation(ValidationError),

    /// Configuration errors
    Config(ConfigError),
}

impl fmt::Display for LabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabError::Entity(e) => write!(f, "{}", e),
            LabError::Store(e) => write!(f, "{}", e),
            LabError::Format(e) => write!(f, "{}", e),
            LabError::Validation(e) => write!(f, "{}", e),
            LabError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LabError::Entity(e) => Some(e),
            LabError::Store(e) => Some(e),
            LabError::Format(e) => Some(e),
            LabError::Validation(e) => Some(e),
            LabError::Config(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LabError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            LabError::Entity(e) => e.status_code(),
            LabError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LabError::Format(_) => StatusCode::BAD_REQUEST,
            LabError::Validation(_) => StatusCode::BAD_REQUEST,
            LabError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LabError::Entity(e) => e.error_code(),
            LabError::Store(e) => e.error_code(),
            LabError::Format(_) => "FORMAT_ERROR",
            LabError::Validation(_) => "VALIDATION_ERROR",
            LabError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            LabError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id
                }))
            }
            LabError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for LabError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity operations
#[derive(Debug)]
pub enum EntityError {
    /// No row with this id (only raised at the HTTP edge; stores return `None`)
    NotFound { entity_type: String, id: i64 },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
        }
    }
}

impl From<EntityError> for LabError {
    fn from(err: EntityError) -> Self {
        LabError::Entity(err)
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by the backing store
///
/// These are the only failures on the read path. They must reach the caller
/// and are never folded into an empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store cannot be reached
    Unavailable { backend: String },

    /// Session acquisition or query did not complete in time
    Timeout { operation: String, after_ms: u64 },

    /// In-flight access was aborted by the caller
    Cancelled { operation: String },

    /// A write would break referential integrity
    ConstraintViolation { entity_type: String, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
            StoreError::Timeout {
                operation,
                after_ms,
            } => {
                write!(f, "Store {} timed out after {}ms", operation, after_ms)
            }
            StoreError::Cancelled { operation } => {
                write!(f, "Store {} was cancelled", operation)
            }
            StoreError::ConstraintViolation {
                entity_type,
                message,
            } => {
                write!(f, "Constraint violation on {}: {}", entity_type, message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "STORE_UNAVAILABLE",
            StoreError::Timeout { .. } => "STORE_TIMEOUT",
            StoreError::Cancelled { .. } => "STORE_CANCELLED",
            StoreError::ConstraintViolation { .. } => "STORE_CONSTRAINT_VIOLATION",
        }
    }
}

impl From<StoreError> for LabError {
    fn from(err: StoreError) -> Self {
        LabError::Store(err)
    }
}

// =============================================================================
// Format Errors
// =============================================================================

/// A temporal value that does not parse under the codec grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("empty {kind} value")]
    Empty { kind: &'static str },

    #[error("'{value}' is not a valid duration (expected HH:MM:SS)")]
    InvalidDuration { value: String },

    #[error("'{value}' is not a valid date (expected d/M/yyyy [H:mm[:ss]])")]
    InvalidDate { value: String },
}

impl From<FormatError> for LabError {
    fn from(err: FormatError) -> Self {
        LabError::Format(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to write payload validation
#[derive(Debug)]
pub enum ValidationError {
    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Required field missing on create
    MissingField { field: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::MissingField { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for LabError {
    fn from(err: ValidationError) -> Self {
        LabError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for LabError {
    fn from(errors: validator::ValidationErrors) -> Self {
        LabError::Validation(errors.into())
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration or fixture file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// A filter or sort key dereferences a related path the load spec does not declare
    UndeclaredLoadPath {
        entity_type: String,
        name: String,
        path: String,
    },

    /// Two entity kinds registered under the same resource name
    DuplicateEntity { entity_type: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::UndeclaredLoadPath {
                entity_type,
                name,
                path,
            } => {
                write!(
                    f,
                    "'{}' on {} requires load path '{}' which is not declared",
                    name, entity_type, path
                )
            }
            ConfigError::DuplicateEntity { entity_type } => {
                write!(f, "Entity type '{}' registered twice", entity_type)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for LabError {
    fn from(err: ConfigError) -> Self {
        LabError::Config(err)
    }
}

/// Result type alias for labqc operations
pub type LabResult<T> = std::result::Result<T, LabError>;
