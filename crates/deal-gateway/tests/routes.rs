//! End-to-end route tests driving the router in-process.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use deal_gateway::{build_router, GatewayConfig};
use deal_index::{DealLookupApi, DealLookupService, DealSnapshot, IndexConfig, Record};

const MAX_BODY: usize = 1024 * 1024;

fn deal(region: &str, sub_region: &str, complex: &str, price: u32) -> Record {
    Record {
        price,
        road: format!("{}-ro", complex),
        ..Record::keyed(region, sub_region, complex)
    }
}

fn app_with(records: Vec<Record>) -> Router {
    let snapshot = DealSnapshot::build(records, IndexConfig::default()).unwrap();
    let api: Arc<dyn DealLookupApi> = Arc::new(DealLookupService::new(Arc::new(snapshot)));
    build_router(api, &GatewayConfig::default())
}

fn app() -> Router {
    app_with(vec![
        deal("A", "1", "X", 100),
        deal("A", "1", "X", 110),
        deal("A", "1", "Y", 200),
        deal("A", "2", "Z", 300),
        deal("B", "1", "W", 400),
    ])
}

/// Region A reappears after B, so rows 0..2 lose their groups.
fn overwritten_app() -> Router {
    app_with(vec![
        deal("A", "1", "X", 100),
        deal("A", "2", "Y", 200),
        deal("B", "1", "W", 300),
        deal("A", "1", "X", 400),
    ])
}

async fn get(uri: &str) -> (StatusCode, Value) {
    get_from(app(), uri).await
}

async fn get_from(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), MAX_BODY).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn provinces_lists_regions_with_first_row() {
    let (status, body) = get("/provinces").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "A": 0, "B": 4 }));
}

#[tokio::test]
async fn cities_lists_sub_regions_of_referenced_row() {
    let (status, body) = get("/cities/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "1": 0, "2": 3 }));
}

#[tokio::test]
async fn complexes_carries_display_fields() {
    let (status, body) = get("/complexes/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["region"], "A");
    assert_eq!(body["sub_region"], "1");
    assert_eq!(body["road"], "Y-ro");
    assert_eq!(body["complexes"], json!({ "X": 0, "Y": 2 }));
}

#[tokio::test]
async fn deals_returns_exactly_the_complex_rows() {
    let (status, body) = get("/deals/1").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], 0);
    assert_eq!(rows[0]["price"], 100);
    assert_eq!(rows[1]["id"], 1);
    assert_eq!(rows[1]["price"], 110);

    let (_, single) = get("/deals/2").await;
    assert_eq!(single.as_array().unwrap().len(), 1);
    assert_eq!(single[0]["complex"], "Y");
}

#[tokio::test]
async fn district_deals_spans_all_complexes() {
    let (status, body) = get("/districts/0/deals").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[tokio::test]
async fn single_deal() {
    let (status, body) = get("/deal/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 4);
    assert_eq!(body["region"], "B");
    assert_eq!(body["complex"], "W");
}

#[tokio::test]
async fn out_of_range_row_is_404() {
    let (status, body) = get("/deals/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "row_out_of_range");
    assert!(body["error"]["message"].as_str().unwrap().contains('5'));
}

#[tokio::test]
async fn non_numeric_row_is_400() {
    for uri in ["/cities/abc", "/deal/-1", "/districts/x/deals"] {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "bad_request");
    }
}

#[tokio::test]
async fn health_reports_counts() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["records"], 5);
    assert_eq!(body["regions"], 2);
    assert_eq!(body["sub_regions"], 3);
    assert_eq!(body["complexes"], 4);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replaced_group_is_key_not_found() {
    for uri in ["/cities/0", "/complexes/1", "/deals/0", "/districts/1/deals"] {
        let (status, body) = get_from(overwritten_app(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"]["code"], "key_not_found", "{}", uri);
    }

    let (status, body) = get_from(overwritten_app(), "/complexes/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complexes"], json!({ "X": 3 }));
}
