//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Store failures stay distinguishable from empty results

use axum::http::StatusCode;
use axum::response::IntoResponse;
use labqc::core::error::FieldValidationError;
use labqc::prelude::*;

fn unavailable() -> StoreError {
    StoreError::Unavailable {
        backend: "in-memory".to_string(),
    }
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_entity_not_found_returns_404() {
        let err = LabError::Entity(EntityError::NotFound {
            entity_type: "batch".to_string(),
            id: 12,
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_every_store_error_returns_500() {
        let errors = vec![
            unavailable(),
            StoreError::Timeout {
                operation: "session".to_string(),
                after_ms: 50,
            },
            StoreError::Cancelled {
                operation: "query".to_string(),
            },
            StoreError::ConstraintViolation {
                entity_type: "batch".to_string(),
                message: "product 99 does not exist".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(
                LabError::Store(err).status_code(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_format_error_returns_400() {
        let err = LabError::Format(FormatError::InvalidDate {
            value: "31/02".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_error_returns_400() {
        let err = LabError::Validation(ValidationError::MissingField {
            field: "email".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_config_error_returns_500() {
        let err = LabError::Config(ConfigError::FileNotFound {
            path: "/etc/labqc.yaml".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_store_error_codes() {
        assert_eq!(unavailable().error_code(), "STORE_UNAVAILABLE");
        assert_eq!(
            StoreError::Timeout {
                operation: "session".to_string(),
                after_ms: 1,
            }
            .error_code(),
            "STORE_TIMEOUT"
        );
        assert_eq!(
            StoreError::Cancelled {
                operation: "query".to_string(),
            }
            .error_code(),
            "STORE_CANCELLED"
        );
        assert_eq!(
            StoreError::ConstraintViolation {
                entity_type: "product".to_string(),
                message: "still referenced".to_string(),
            }
            .error_code(),
            "STORE_CONSTRAINT_VIOLATION"
        );
    }

    #[test]
    fn test_lab_error_codes() {
        assert_eq!(
            LabError::Format(FormatError::Empty { kind: "duration" }).error_code(),
            "FORMAT_ERROR"
        );
        assert_eq!(
            LabError::Validation(ValidationError::MissingField {
                field: "name".to_string()
            })
            .error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            LabError::Config(ConfigError::FileNotFound {
                path: "lab.yaml".to_string()
            })
            .error_code(),
            "CONFIG_ERROR"
        );
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_error_response_has_code_and_message() {
        let err = LabError::Entity(EntityError::NotFound {
            entity_type: "report".to_string(),
            id: 3,
        });

        let response = err.to_response();

        assert_eq!(response.code, "ENTITY_NOT_FOUND");
        assert_eq!(response.message, "report with id '3' not found");
    }

    #[test]
    fn test_store_error_response_has_no_details() {
        let response = LabError::Store(unavailable()).to_response();

        assert_eq!(response.code, "STORE_UNAVAILABLE");
        assert!(response.message.contains("in-memory"));
        assert!(response.details.is_none());
    }

    #[test]
    fn test_validation_errors_include_field_details() {
        let err = LabError::Validation(ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "email".to_string(),
                message: "invalid format".to_string(),
            },
            FieldValidationError {
                field: "name".to_string(),
                message: "required".to_string(),
            },
        ]));

        let response = err.to_response();

        let details = response.details.expect("field errors carry details");
        let fields = details["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["field"], "email");
        assert_eq!(
            response.message,
            "Validation errors: email: invalid format, name: required"
        );
    }

    #[test]
    fn test_format_error_messages() {
        assert_eq!(
            FormatError::InvalidDuration {
                value: "1h30".to_string()
            }
            .to_string(),
            "'1h30' is not a valid duration (expected HH:MM:SS)"
        );
        assert_eq!(
            FormatError::Empty { kind: "date" }.to_string(),
            "empty date value"
        );
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_store_error_converts_to_lab_error() {
        let err: LabError = unavailable().into();
        assert!(matches!(
            err,
            LabError::Store(StoreError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_format_error_converts_to_lab_error() {
        let err: LabError = parse_duration("soon").unwrap_err().into();
        assert!(matches!(
            err,
            LabError::Format(FormatError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_config_error_converts_to_lab_error() {
        let err: LabError = ConfigError::DuplicateEntity {
            entity_type: "batch".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert_eq!(err.to_string(), "Entity type 'batch' registered twice");
    }

    #[test]
    fn test_validator_errors_convert_sorted_by_field() {
        use validator::Validate;

        let input = labqc::entities::CustomerInput {
            name: Some(String::new()),
            email: Some("nope".to_string()),
            ..Default::default()
        };
        let err: LabError = input.validate().unwrap_err().into();

        match err {
            LabError::Validation(ValidationError::FieldErrors(fields)) => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["email", "name"]);
            }
            other => panic!("Expected FieldErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = LabError::Store(unavailable());
        let source = err.source().expect("store errors carry a source");
        assert_eq!(source.to_string(), unavailable().to_string());
        let err = LabError::Format(FormatError::Empty { kind: "date" });
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("empty date value"));
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_not_found_into_response_status() {
        let err = LabError::Entity(EntityError::NotFound {
            entity_type: "machine".to_string(),
            id: 5,
        });

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_error_into_response_status() {
        let response = LabError::Store(unavailable()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_format_error_into_response_status() {
        let response = LabError::Format(FormatError::Empty { kind: "date" }).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Store Error Propagation Tests
// =============================================================================

mod store_error_tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_store_is_not_an_empty_result() {
        let store = InMemoryStore::new();
        store.set_available(false);

        let err = store.session().await.err().expect("session should fail");
        assert_eq!(err, unavailable());
    }

    #[tokio::test]
    async fn test_available_empty_store_returns_empty_list() {
        let store = InMemoryStore::new();
        let session = store.session().await.expect("session should open");

        let rows = QueryExecutor::execute::<Batch, _>(&session, &QueryParams::new())
            .await
            .expect("empty store is not a failure");
        assert!(rows.is_empty());
    }
}
