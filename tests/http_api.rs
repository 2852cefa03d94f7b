//! End-to-end HTTP tests driving the full router with `tower::oneshot`.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use dealradar::api;
use dealradar::app_state::AppState;
use dealradar::domain::{
    ClaimLedger, DealStore, EventBus, RatingAggregator, SubscriptionIndex, VendorDirectory,
};
use dealradar::service::{MarketService, MockContentGenerator};

fn test_app() -> Router {
    let vendors = Arc::new(VendorDirectory::new());
    let market = Arc::new(MarketService::new(
        Arc::new(DealStore::new()),
        Arc::new(ClaimLedger::new()),
        Arc::new(RatingAggregator::new(Arc::clone(&vendors))),
        Arc::new(SubscriptionIndex::new()),
        vendors,
        Arc::new(MockContentGenerator::new()),
        EventBus::new(64),
    ));
    let event_bus = market.event_bus().clone();

    api::build_router().with_state(AppState {
        market,
        event_bus,
        event_log: None,
    })
}

fn request(method: &str, uri: &str, user: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = user {
        builder = builder.header("x-user-id", id).header("x-user-role", role);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    let Ok(request) = request else {
        panic!("failed to build request");
    };
    request
}

async fn body_json(response: axum::response::Response) -> Value {
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("failed to read body");
    };
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn deal_body() -> Value {
    json!({
        "title": "Espresso -50%",
        "description": "Until closing",
        "lat": 50.0647,
        "lon": 19.9450,
        "category": "FOOD",
        "expires_at": (Utc::now() + Duration::hours(2)).to_rfc3339(),
    })
}

const VENDOR: &str = "11111111-1111-1111-1111-111111111111";
const CUSTOMER: &str = "22222222-2222-2222-2222-222222222222";
const ADMIN: &str = "33333333-3333-3333-3333-333333333333";

#[tokio::test]
async fn health_is_open() {
    let app = test_app();
    let response = app.oneshot(request("GET", "/health", None, None)).await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn create_deal_requires_principal_headers() {
    let app = test_app();
    let response = app
        .oneshot(request("POST", "/api/v1/deals", None, Some(deal_body())))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 4001);
}

#[tokio::test]
async fn create_deal_rejects_customers() {
    let app = test_app();
    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((CUSTOMER, "customer")),
            Some(deal_body()),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 4003);
}

#[tokio::test]
async fn vendor_publishes_and_deal_is_retrievable() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((VENDOR, "vendor")),
            Some(deal_body()),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["title"], "Espresso -50%");
    assert_eq!(created["title_ai"], "AI: Espresso -50%");
    assert_eq!(created["status"], "ACTIVE");

    let Some(id) = created["id"].as_str() else {
        panic!("missing deal id");
    };
    let response = app
        .oneshot(request("GET", &format!("/api/v1/deals/{id}"), None, None))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(response).await;
    assert_eq!(fetched["id"], created["id"]);
}

#[tokio::test]
async fn huge_page_number_is_an_empty_page() {
    let app = test_app();
    let _ = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((VENDOR, "vendor")),
            Some(deal_body()),
        ))
        .await;

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/deals?page=4294967295&per_page=100",
            None,
            None,
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn publish_with_past_expiry_is_rejected() {
    let app = test_app();
    let mut body = deal_body();
    body["expires_at"] = json!((Utc::now() - Duration::minutes(5)).to_rfc3339());

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((VENDOR, "vendor")),
            Some(body),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 1004);
}

#[tokio::test]
async fn nearby_search_filters_by_distance() {
    let app = test_app();
    let _ = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((VENDOR, "vendor")),
            Some(deal_body()),
        ))
        .await;

    // Same neighbourhood: the deal is inside the default 2 km radius.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/deals/nearby?lat=50.0650&lon=19.9440",
            None,
            None,
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["radius_meters"], 2000.0);

    // Warsaw, ~250 km away.
    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/deals/nearby?lat=52.2297&lon=21.0122",
            None,
            None,
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn duplicate_claim_conflicts() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((VENDOR, "vendor")),
            Some(deal_body()),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    let created = body_json(response).await;
    let Some(id) = created["id"].as_str() else {
        panic!("missing deal id");
    };
    let claim_uri = format!("/api/v1/deals/{id}/claims");

    let response = app
        .clone()
        .oneshot(request("POST", &claim_uri, Some((CUSTOMER, "customer")), None))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("POST", &claim_uri, Some((CUSTOMER, "customer")), None))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 2101);
}

#[tokio::test]
async fn standalone_rating_updates_vendor_aggregate() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((VENDOR, "vendor")),
            Some(deal_body()),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    let created = body_json(response).await;
    let Some(id) = created["id"].as_str() else {
        panic!("missing deal id");
    };
    let rating_uri = format!("/api/v1/deals/{id}/ratings");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &rating_uri,
            Some((CUSTOMER, "customer")),
            Some(json!({"rating": 5, "comment": "great"})),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["rating"], 5);
    assert_eq!(body["vendor"]["count"], 1);
    assert_eq!(body["vendor"]["average"], 5.0);

    // Same user rating the same deal again conflicts.
    let response = app
        .oneshot(request(
            "POST",
            &rating_uri,
            Some((CUSTOMER, "customer")),
            Some(json!({"rating": 4})),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 2102);
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/deals",
            Some((VENDOR, "vendor")),
            Some(deal_body()),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    let created = body_json(response).await;
    let Some(id) = created["id"].as_str() else {
        panic!("missing deal id");
    };

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/v1/deals/{id}/ratings"),
            Some((CUSTOMER, "customer")),
            Some(json!({"rating": 6})),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 1002);
}

#[tokio::test]
async fn subscription_radius_bound_is_enforced() {
    let app = test_app();
    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/notifications/subscriptions",
            Some((CUSTOMER, "customer")),
            Some(json!({
                "token": "device-1",
                "lat": 50.0647,
                "lon": 19.9450,
                "radius_m": 50_001.0,
            })),
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], 1003);
}

#[tokio::test]
async fn resubscribing_replaces_the_token_row() {
    let app = test_app();
    let subscribe = |radius: f64| {
        request(
            "POST",
            "/api/v1/notifications/subscriptions",
            Some((CUSTOMER, "customer")),
            Some(json!({
                "token": "device-1",
                "lat": 50.0647,
                "lon": 19.9450,
                "radius_m": radius,
            })),
        )
    };

    let first = app.clone().oneshot(subscribe(1_000.0)).await;
    assert!(first.is_ok_and(|r| r.status() == StatusCode::CREATED));
    let second = app.clone().oneshot(subscribe(5_000.0)).await;
    assert!(second.is_ok_and(|r| r.status() == StatusCode::CREATED));

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/notifications/subscriptions",
            Some((CUSTOMER, "customer")),
            None,
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["radius_m"], 5000.0);
}

#[tokio::test]
async fn unsubscribe_is_idempotent() {
    let app = test_app();
    let response = app
        .oneshot(request(
            "DELETE",
            "/api/v1/notifications/subscriptions?token=never-registered",
            Some((CUSTOMER, "customer")),
            None,
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn event_log_requires_admin_and_reports_disabled_persistence() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/admin/event-log",
            Some((CUSTOMER, "customer")),
            None,
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/admin/event-log",
            Some((ADMIN, "admin")),
            None,
        ))
        .await;
    let Ok(response) = response else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["persistence_enabled"], false);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}
