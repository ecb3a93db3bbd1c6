use super::common::*;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::budget::{budget_router, BudgetQuotaService, QuotaPolicy};

fn params(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
    Query(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn validate_handler_reports_missing_tiers() {
    let service = Arc::new(build_service());
    let response = crate::workflows::budget::router::validate_handler::<MemoryStore>(
        State(service),
        params(&[("subcategory_id", "10")]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["budget_count"], json!(1));
    assert_eq!(body["data"]["missing_budgets"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn validate_handler_rejects_missing_subcategory() {
    let service = Arc::new(build_service());
    let response =
        crate::workflows::budget::router::validate_handler::<MemoryStore>(State(service), params(&[]))
            .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn mapping_handler_returns_internal_error_on_store_failure() {
    let service = Arc::new(BudgetQuotaService::new(
        Arc::new(UnavailableStore),
        QuotaPolicy::default(),
    ));
    let response = crate::workflows::budget::router::mapping_handler::<UnavailableStore>(
        State(service),
        params(&[("subcategory_id", "10")]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

async fn post_resolve(payload: serde_json::Value) -> axum::response::Response {
    let router = budget_router(Arc::new(build_service()));
    router
        .oneshot(
            Request::post("/api/v1/budgets/resolve")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn resolve_route_accepts_synonym_claims() {
    let response = post_resolve(json!({
        "subcategory_id": 10,
        "year": "2568",
        "form": { "author_status": "first_author", "journal_quartile": "top5" }
    }))
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["data"]["budget"]["code"], json!("T5"));
    assert_eq!(body["data"]["budget"]["budget_id"], json!(101));
    assert_eq!(body["data"]["selection"]["rerouted"], json!(false));
}

#[tokio::test]
async fn resolve_route_maps_claim_failures_to_statuses() {
    let exhausted = post_resolve(json!({
        "subcategory_id": 10,
        "form": { "journal_quartile": "Q1" }
    }))
    .await;
    assert_eq!(exhausted.status(), StatusCode::CONFLICT);

    let missing = post_resolve(json!({
        "subcategory_id": 10,
        "form": { "journal_quartile": "Q2" }
    }))
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(missing).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap_or_default().contains("Q2"));
}

#[tokio::test]
async fn summary_route_lists_consumers() {
    let router = budget_router(Arc::new(build_service()));
    let response = router
        .oneshot(
            Request::get("/api/v1/quota/summary?year_ids=2568")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["rows"][0]["user_id"], json!(7));
}

#[tokio::test]
async fn usage_route_rejects_malformed_year_list() {
    let router = budget_router(Arc::new(build_service()));
    let response = router
        .oneshot(
            Request::get("/api/v1/quota/usage?year_ids=2568,abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn usage_route_reports_source_and_statuses() {
    let router = budget_router(Arc::new(build_service()));
    let response = router
        .oneshot(Request::get("/api/v1/quota/usage").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["data"]["source"], json!("recomputed"));
    assert_eq!(body["data"]["statuses"]["pending"], json!(1));
    assert_eq!(body["data"]["usage"][0]["used_grants"], json!(1));
}
