//! Tests for disruption report submission

mod common;

use chrono::{Duration, Utc};
use common::{create_test_server, submit_report};
use serde_json::{json, Value};

/// Test: all fields are required
#[tokio::test]
async fn test_submit_missing_fields() {
    let (server, _ctx) = create_test_server();

    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": "86",
            "location": "",
            "severity": "low",
            "description": "minor delay",
            "disruption": "delay",
            "user_id": "u1",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "All fields are required");
}

/// Test: severity outside the enumerated set is rejected
#[tokio::test]
async fn test_submit_invalid_severity() {
    let (server, _ctx) = create_test_server();

    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": "86",
            "location": "Bourke St/Swanston St",
            "severity": "catastrophic",
            "description": "minor delay",
            "disruption": "delay",
            "user_id": "u1",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid severity level");
}

/// Test: disruption type outside the enumerated set is rejected
#[tokio::test]
async fn test_submit_invalid_disruption_type() {
    let (server, _ctx) = create_test_server();

    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": "86",
            "location": "Bourke St/Swanston St",
            "severity": "low",
            "description": "minor delay",
            "disruption": "strike",
            "user_id": "u1",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid disruption type");
}

/// Test: a valid submission echoes the stored report
#[tokio::test]
async fn test_submit_success() {
    let (server, _ctx) = create_test_server();

    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": "86",
            "location": "Bourke St/Swanston St",
            "severity": "low",
            "description": "minor delay",
            "disruption": "delay",
            "user_id": "u1",
        }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["message"], "Disruption report submitted successfully");
    assert_eq!(body["data"]["route_number"], "86");
    assert_eq!(body["data"]["location"], "Bourke St/Swanston St");
    assert_eq!(body["data"]["severity"], "low");
    assert_eq!(body["data"]["disruption"], "delay");
    assert!(body["data"]["id"].as_str().is_some());
}

/// Test: immediate resubmission for the same route and location conflicts
#[tokio::test]
async fn test_submit_duplicate_window() {
    let (server, _ctx) = create_test_server();

    submit_report(&server, "86", "Bourke St/Swanston St", "u1").await;

    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": "86",
            "location": "Bourke St/Swanston St",
            "severity": "high",
            "description": "another report",
            "disruption": "delay",
            "user_id": "u2",
        }))
        .await;

    assert_eq!(response.status_code(), 409);
}

/// Test: a report older than the duplicate window does not block a new one
#[tokio::test]
async fn test_submit_after_window_elapsed() {
    let (server, ctx) = create_test_server();

    let id = submit_report(&server, "86", "Bourke St/Swanston St", "u1").await;
    ctx.disruption_store
        .set_created_at(&id, Utc::now() - Duration::hours(25))
        .unwrap();

    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": "86",
            "location": "Bourke St/Swanston St",
            "severity": "low",
            "description": "fresh report",
            "disruption": "delay",
            "user_id": "u2",
        }))
        .await;

    assert_eq!(response.status_code(), 201);
}

/// Test: different location on the same route is not a duplicate
#[tokio::test]
async fn test_submit_different_location_allowed() {
    let (server, _ctx) = create_test_server();

    submit_report(&server, "86", "Bourke St/Swanston St", "u1").await;

    let response = server
        .post("/disruptions")
        .json(&json!({
            "route_number": "86",
            "location": "Spring St",
            "severity": "low",
            "description": "minor delay",
            "disruption": "delay",
            "user_id": "u1",
        }))
        .await;

    assert_eq!(response.status_code(), 201);
}
