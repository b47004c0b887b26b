//! HTTP round-trips through the generated CRUD routes
//!
//! JSON → HTTP request → handler → query engine / store → HTTP response → JSON.

mod lab_harness;

use axum::http::StatusCode;
use axum_test::TestServer;
use lab_harness::*;
use labqc::prelude::*;
use serde_json::{Value, json};

fn make_server() -> (TestServer, InMemoryStore) {
    let store = seeded_store();
    let server = TestServer::new(lab_router(store.clone()));
    (server, store)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _) = make_server();

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_without_parameters() {
    let (server, _) = make_server();

    let response = server.get("/api/products").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["count"], 3);
    assert_eq!(field_values(&body, "id"), vec![json!(1), json!(2), json!(3)]);
    assert_eq!(body["items"][0]["createdAt"], "02/01/2024 09:00");
}

#[tokio::test]
async fn test_list_filter_and_sort() {
    let (server, _) = make_server();

    let response = server
        .get("/api/batches")
        .add_query_param("customerName", "acme")
        .add_query_param("sortBy", "productionDate")
        .add_query_param("isAscending", "false")
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(
        field_values(&body, "name"),
        vec![json!("Batch-001-R"), json!("Batch-001")]
    );
    // The customer was loaded for the filter, the product was not needed
    assert_eq!(body["items"][0]["customerName"], "Acme Corp");
    assert_eq!(body["items"][0]["productName"], Value::Null);
}

#[tokio::test]
async fn test_list_query_keys_ignore_case() {
    let (server, _) = make_server();

    let response = server
        .get("/api/batches")
        .add_query_param("EXACTBATCHNAME", "Batch-001")
        .await;

    let body: Value = response.json();
    assert_eq!(field_values(&body, "id"), vec![json!(1)]);
}

#[tokio::test]
async fn test_list_malformed_values_are_ignored() {
    let (server, _) = make_server();

    let response = server
        .get("/api/batches")
        .add_query_param("productId", "abc")
        .add_query_param("sortBy", "nonsense")
        .add_query_param("isAscending", "sideways")
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["count"], 4);
    assert_eq!(
        field_values(&body, "id"),
        vec![json!(1), json!(2), json!(3), json!(4)]
    );
}

#[tokio::test]
async fn test_list_test_results_carries_durations() {
    let (server, _) = make_server();

    let response = server
        .get("/api/test_results")
        .add_query_param("sortBy", "duration")
        .await;

    let body: Value = response.json();
    assert_eq!(
        field_values(&body, "duration"),
        vec![Value::Null, json!("00:20:00"), json!("00:45:00")]
    );
}

#[tokio::test]
async fn test_list_fails_when_store_is_unavailable() {
    let (server, store) = make_server();
    store.set_available(false);

    let response = server.get("/api/batches").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert!(body.get("items").is_none());
}

// =============================================================================
// Get
// =============================================================================

#[tokio::test]
async fn test_get_loads_related_names() {
    let (server, _) = make_server();

    let response = server.get("/api/batches/1").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["name"], "Batch-001");
    assert_eq!(body["productName"], "Epoxy Resin");
    assert_eq!(body["customerName"], "Acme Corp");
    assert_eq!(body["productionDate"], "01/05/2024 06:00");
}

#[tokio::test]
async fn test_get_unknown_id_is_404() {
    let (server, _) = make_server();

    let response = server.get("/api/batches/999").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["code"], "ENTITY_NOT_FOUND");
    assert_eq!(body["details"]["id"], 999);
}

#[tokio::test]
async fn test_get_non_numeric_id_is_rejected() {
    let (server, _) = make_server();

    let response = server.get("/api/batches/abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_test_result() {
    let (server, _) = make_server();

    let response = server
        .post("/api/test_results")
        .json(&json!({
            "productId": 1,
            "machineId": 2,
            "testName": "Hardness",
            "testDate": "10/6/2024 9:00",
            "duration": "1:30:00",
            "value": 12.5,
            "unit": "HV",
            "passed": true
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["id"], 4);
    assert_eq!(body["testDate"], "10/06/2024 09:00");
    assert_eq!(body["duration"], "01:30:00");
    assert_eq!(body["productName"], "Epoxy Resin");
    assert_eq!(body["machineName"], "Viscometer");
}

#[tokio::test]
async fn test_create_without_duration_leaves_it_unset() {
    let (server, _) = make_server();

    let response = server
        .post("/api/test_results")
        .json(&json!({
            "productId": 1,
            "machineId": 1,
            "testName": "Density",
            "testDate": "10/06/2024"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["duration"], Value::Null);
    assert_eq!(body["testDate"], "10/06/2024 00:00");
}

#[tokio::test]
async fn test_create_with_malformed_duration_is_400() {
    let (server, _) = make_server();

    let response = server
        .post("/api/test_results")
        .json(&json!({
            "productId": 1,
            "machineId": 1,
            "testName": "Hardness",
            "testDate": "10/06/2024 09:00",
            "duration": "ninety minutes"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "FORMAT_ERROR");
}

#[tokio::test]
async fn test_create_missing_required_field_is_400() {
    let (server, _) = make_server();

    let response = server
        .post("/api/products")
        .json(&json!({ "name": "Sealant" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Missing required field: code");
}

#[tokio::test]
async fn test_create_invalid_email_reports_field() {
    let (server, _) = make_server();

    let response = server
        .post("/api/customers")
        .json(&json!({ "name": "Initech", "email": "not-an-email" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["fields"][0]["field"], "email");
}

#[tokio::test]
async fn test_create_with_missing_parent_fails() {
    let (server, _) = make_server();

    let response = server
        .post("/api/batches")
        .json(&json!({
            "name": "Orphan",
            "productId": 99,
            "productionDate": "01/07/2024 06:00"
        }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["code"], "STORE_CONSTRAINT_VIOLATION");
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_changes_only_present_fields() {
    let (server, _) = make_server();

    let response = server
        .put("/api/machines/1")
        .json(&json!({ "location": "Lab C" }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["location"], "Lab C");
    assert_eq!(body["name"], "Tensile Tester");
    assert_eq!(body["lastMaintenance"], "01/03/2024 08:00");
}

#[tokio::test]
async fn test_update_null_clears_nullable_reference() {
    let (server, _) = make_server();

    let response = server
        .put("/api/batches/1")
        .json(&json!({ "customerId": null }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["customerId"], Value::Null);
    assert_eq!(body["customerName"], Value::Null);
    assert_eq!(body["productName"], "Epoxy Resin");

    // An absent key leaves the cleared value alone, a value sets it again
    let body: Value = server
        .put("/api/batches/1")
        .json(&json!({ "quantity": 510 }))
        .await
        .json();
    assert_eq!(body["customerId"], Value::Null);

    let body: Value = server
        .put("/api/batches/1")
        .json(&json!({ "customerId": 3 }))
        .await
        .json();
    assert_eq!(body["customerName"], "Globex");
}

#[tokio::test]
async fn test_update_null_clears_duration() {
    let (server, _) = make_server();

    let response = server
        .put("/api/test_results/1")
        .json(&json!({ "duration": null }))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["duration"], Value::Null);
    assert_eq!(body["testName"], "Tensile Strength");
}

#[tokio::test]
async fn test_update_unknown_id_is_404() {
    let (server, _) = make_server();

    let response = server
        .put("/api/machines/77")
        .json(&json!({ "location": "Lab C" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_with_malformed_date_keeps_row() {
    let (server, _) = make_server();

    let response = server
        .put("/api/machines/1")
        .json(&json!({ "lastMaintenance": "last tuesday", "location": "Lab Z" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = server.get("/api/machines/1").await.json();
    assert_eq!(body["location"], "Lab A");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_then_get_is_404() {
    let (server, _) = make_server();

    server
        .delete("/api/reports/2")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get("/api/reports/2")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/api/reports/2")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_referenced_row_fails() {
    let (server, _) = make_server();

    let response = server.delete("/api/customers/1").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    server
        .get("/api/customers/1")
        .await
        .assert_status(StatusCode::OK);
}
