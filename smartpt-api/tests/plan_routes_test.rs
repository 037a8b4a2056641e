//! Tests for trip planning and geocoding

mod common;

use common::{create_test_server, route};
use serde_json::{json, Value};

/// Test: origin and destination are required
#[tokio::test]
async fn test_plan_missing_fields() {
    let (server, _ctx) = create_test_server();

    let response = server
        .post("/routes")
        .json(&json!({ "origin": "Flinders St Station" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Test: identical routes from different variants collapse to one
#[tokio::test]
async fn test_plan_dedups_across_variants() {
    let (server, ctx) = create_test_server();

    ctx.directions
        .set_routes(0, vec![route("via Swanston St", 1800, 5200)]);
    ctx.directions
        .set_routes(1, vec![route("via Swanston St", 1800, 5200)]);
    ctx.directions
        .set_routes(2, vec![route("via Collins St", 2100, 5000)]);

    let response = server
        .post("/routes")
        .json(&json!({
            "origin": "Flinders St Station",
            "destination": "Melbourne University",
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
}

/// Test: results come back fastest first
#[tokio::test]
async fn test_plan_sorted_by_duration() {
    let (server, ctx) = create_test_server();

    ctx.directions
        .set_routes(0, vec![route("via La Trobe St", 2400, 6100)]);
    ctx.directions
        .set_routes(1, vec![route("via Swanston St", 1800, 5200)]);
    ctx.directions
        .set_routes(2, vec![route("via Collins St", 2100, 5000)]);

    let body: Value = server
        .post("/routes")
        .json(&json!({
            "origin": "Flinders St Station",
            "destination": "Melbourne University",
        }))
        .await
        .json();

    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 3);
    let durations: Vec<i64> = routes
        .iter()
        .map(|r| r["duration"]["value"].as_i64().unwrap())
        .collect();
    assert_eq!(durations, vec![1800, 2100, 2400]);
}

/// Test: one variant failing is skipped, not fatal
#[tokio::test]
async fn test_plan_tolerates_partial_failure() {
    let (server, ctx) = create_test_server();

    ctx.directions
        .set_routes(0, vec![route("via Swanston St", 1800, 5200)]);
    ctx.directions
        .set_error(1, "Directions API error: OVER_QUERY_LIMIT");
    ctx.directions
        .set_routes(2, vec![route("via Collins St", 2100, 5000)]);

    let response = server
        .post("/routes")
        .json(&json!({
            "origin": "Flinders St Station",
            "destination": "Melbourne University",
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["routes"].as_array().unwrap().len(), 2);
}

/// Test: nothing found is an empty set, not an error
#[tokio::test]
async fn test_plan_no_routes() {
    let (server, _ctx) = create_test_server();

    let response = server
        .post("/routes")
        .json(&json!({
            "origin": "Flinders St Station",
            "destination": "Melbourne University",
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["routes"].as_array().unwrap().len(), 0);
}

/// Test: forward geocoding by address
#[tokio::test]
async fn test_geocode_address() {
    let (server, _ctx) = create_test_server();

    let response = server.get("/geocode?address=Bourke%20St").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["results"][0]["name"], "Bourke St");
}

/// Test: reverse geocoding by coordinates
#[tokio::test]
async fn test_geocode_reverse() {
    let (server, _ctx) = create_test_server();

    let response = server.get("/geocode?lat=-37.8136&lng=144.9631").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["results"][0]["location"]["lat"], -37.8136);
}

/// Test: geocoding needs either an address or coordinates
#[tokio::test]
async fn test_geocode_requires_query() {
    let (server, _ctx) = create_test_server();

    let response = server.get("/geocode").await;
    assert_eq!(response.status_code(), 400);
}
