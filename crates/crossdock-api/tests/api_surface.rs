//! End-to-end router tests against the full application, in-memory mode.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use crossdock_api::state::{AppConfig, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper: fresh in-memory state, no database, no metrics.
fn test_state() -> AppState {
    AppState::new(AppConfig::default())
}

/// Helper: run one request against the full app sharing `state`.
async fn send(state: &AppState, req: Request<Body>) -> axum::response::Response {
    crossdock_api::app(state.clone(), None)
        .oneshot(req)
        .await
        .unwrap()
}

/// Helper: read the response body as bytes and deserialize from JSON.
async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_probes_respond() {
    let state = test_state();
    let resp = send(&state, get("/health/liveness")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&state, get("/health/readiness")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let state = test_state();
    let resp = send(&state, get("/openapi.json")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let spec = body_json(resp).await;
    assert!(spec["paths"]["/v1/quotes"].is_object());
}

#[tokio::test]
async fn quote_flow_applies_minimum_charge() {
    let state = test_state();
    let warehouse_id = Uuid::new_v4();

    let resp = send(
        &state,
        post(
            "/v1/zones",
            json!({"name": "North America", "countries": ["US", "CA"]}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let zone = body_json(resp).await;
    let zone_id = zone["id"].as_str().unwrap().to_string();

    let resp = send(
        &state,
        post(
            "/v1/rates",
            json!({
                "warehouse_id": warehouse_id,
                "zone_id": zone_id,
                "service_level": "standard",
                "base_rate": "10",
                "per_kg_rate": "2",
                "min_charge": "15",
                "currency": "USD",
                "effective_from": "2026-01-01",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // base 10 + 2/kg × 2 kg = 14, under the 15 minimum.
    let resp = send(
        &state,
        post(
            "/v1/quotes",
            json!({
                "warehouse_id": warehouse_id,
                "destination": "us",
                "service_level": "standard",
                "actual_weight_kg": "2",
                "as_of": "2026-06-01",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let quote = body_json(resp).await;
    assert_eq!(quote["total"], "15.00");
    assert_eq!(quote["currency"], "USD");
    assert_eq!(quote["chargeable_weight"], "2");
}

#[tokio::test]
async fn quote_uses_volumetric_weight_when_heavier() {
    let state = test_state();
    let warehouse_id = Uuid::new_v4();

    let resp = send(
        &state,
        post("/v1/zones", json!({"name": "Gulf", "countries": ["AE"]})),
    )
    .await;
    let zone = body_json(resp).await;

    send(
        &state,
        post(
            "/v1/rates",
            json!({
                "warehouse_id": warehouse_id,
                "zone_id": zone["id"],
                "service_level": "express",
                "base_rate": "5",
                "per_kg_rate": "3",
                "min_charge": "1",
                "currency": "USD",
                "effective_from": "2026-01-01",
            }),
        ),
    )
    .await;

    // 50×40×30 / 5000 = 12 kg volumetric, above the 2 kg scale weight.
    let resp = send(
        &state,
        post(
            "/v1/quotes",
            json!({
                "warehouse_id": warehouse_id,
                "destination": "AE",
                "service_level": "express",
                "actual_weight_kg": "2",
                "dimensions": {"length_cm": "50", "width_cm": "40", "height_cm": "30"},
                "as_of": "2026-06-01",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let quote = body_json(resp).await;
    assert_eq!(quote["volumetric_weight_kg"], "12");
    assert_eq!(quote["chargeable_weight"], "12");
    // 5 + 3 × 12 = 41.
    assert_eq!(quote["total"], "41.00");
}

#[tokio::test]
async fn resolve_unknown_country_returns_404() {
    let state = test_state();
    let resp = send(&state, get("/v1/zones/resolve/ZZ")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_country_code_returns_422() {
    let state = test_state();
    let resp = send(&state, get("/v1/zones/resolve/USA1")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_fields_are_rejected() {
    let state = test_state();
    let resp = send(
        &state,
        post(
            "/v1/zones",
            json!({"name": "Europe", "countries": ["DE"], "surprise": true}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn bin_capacity_is_enforced_over_http() {
    let state = test_state();
    let warehouse_id = Uuid::new_v4();

    let resp = send(
        &state,
        post(
            "/v1/bins",
            json!({"warehouse_id": warehouse_id, "code": "A-01", "capacity": 1}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bin = body_json(resp).await;
    let bin_id = bin["id"].as_str().unwrap().to_string();

    let mut package_ids = Vec::new();
    for tracking in ["TRK-1", "TRK-2"] {
        let resp = send(
            &state,
            post(
                "/v1/packages",
                json!({
                    "warehouse_id": warehouse_id,
                    "tracking_number": tracking,
                    "actual_weight_kg": "1.5",
                }),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let package = body_json(resp).await;
        package_ids.push(package["id"].as_str().unwrap().to_string());
    }

    let resp = send(
        &state,
        post(
            &format!("/v1/bins/{bin_id}/assignments"),
            json!({"package_id": package_ids[0]}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
        &state,
        post(
            &format!("/v1/bins/{bin_id}/assignments"),
            json!({"package_id": package_ids[1]}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The occupied bin shows up in the listing with its counter.
    let resp = send(
        &state,
        get(&format!("/v1/bins?warehouse_id={warehouse_id}")),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["bins"][0]["occupancy"], 1);

    // No drift between counters and history.
    let resp = send(&state, get("/v1/bins/occupancy-drift")).await;
    let body = body_json(resp).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn storage_accrual_is_idempotent_over_http() {
    let state = test_state();
    let warehouse_id = Uuid::new_v4();

    let resp = send(
        &state,
        post(
            "/v1/storage-pricing",
            json!({
                "free_days": 7,
                "daily_rate": "0.50",
                "currency": "USD",
                "effective_from": "2020-01-01",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
        &state,
        post(
            "/v1/packages",
            json!({
                "warehouse_id": warehouse_id,
                "tracking_number": "TRK-9",
                "actual_weight_kg": "1",
            }),
        ),
    )
    .await;
    let package = body_json(resp).await;
    let package_id = package["id"].as_str().unwrap().to_string();

    let resp = send(
        &state,
        post(
            "/v1/bins",
            json!({"warehouse_id": warehouse_id, "code": "B-07", "capacity": 10}),
        ),
    )
    .await;
    let bin = body_json(resp).await;
    let bin_id = bin["id"].as_str().unwrap().to_string();

    send(
        &state,
        post(
            &format!("/v1/bins/{bin_id}/assignments"),
            json!({"package_id": package_id}),
        ),
    )
    .await;

    // Assignment opened just now; accrue ten days ahead: 7 free + 3 billed.
    let through = (Utc::now() + Duration::days(10)).date_naive();
    let resp = send(
        &state,
        post(
            &format!("/v1/packages/{package_id}/storage-charges/accrue"),
            json!({"through": through}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["emitted"], 1);
    assert_eq!(body["charges"][0]["days_charged"], 3);
    assert_eq!(body["charges"][0]["free_days_applied"], 7);
    assert_eq!(body["charges"][0]["total_storage_fee"], "1.50");

    // Second run over the same window emits nothing.
    let resp = send(
        &state,
        post(
            &format!("/v1/packages/{package_id}/storage-charges/accrue"),
            json!({"through": through}),
        ),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["emitted"], 0);

    // Charge listing totals per currency.
    let resp = send(
        &state,
        get(&format!("/v1/packages/{package_id}/storage-charges")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["totals"]["USD"], "1.50");

    // Invoicing is idempotent.
    let charge_id = body["charges"][0]["id"].as_str().unwrap().to_string();
    let resp = send(
        &state,
        post(&format!("/v1/storage-charges/{charge_id}/invoice"), json!({})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let charge = body_json(resp).await;
    assert_eq!(charge["is_invoiced"], true);
}

#[tokio::test]
async fn accrue_unknown_package_returns_404() {
    let state = test_state();
    let resp = send(
        &state,
        post(
            &format!("/v1/packages/{}/storage-charges/accrue", Uuid::new_v4()),
            json!({}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
