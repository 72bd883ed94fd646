mod common;

use common::{decimal_field, TestApp};
use http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn health_probe_reports_running() {
    let app = TestApp::offline().await;

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn offline_listing_serves_mock_catalog() {
    let app = TestApp::offline().await;

    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
    assert_eq!(body[0]["name"], "Classic Red Roses");
    assert_eq!(decimal_field(&body[0]["price"]), dec!(59.99));
}

#[tokio::test]
async fn offline_listing_honors_filters() {
    let app = TestApp::offline().await;

    let (_, roses) = app.get("/api/products?category=roses").await;
    assert_eq!(roses.as_array().unwrap().len(), 1);
    assert_eq!(roses[0]["category"], "roses");

    let (_, featured) = app.get("/api/products?featured=true").await;
    assert_eq!(featured.as_array().unwrap().len(), 4);

    let (_, limited) = app.get("/api/products?limit=2").await;
    assert_eq!(limited.as_array().unwrap().len(), 2);

    let (_, all) = app.get("/api/products?category=all").await;
    assert_eq!(all.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let app = TestApp::offline().await;

    let (status, body) = app.get("/api/products?category=cacti").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("cacti"));
}

#[tokio::test]
async fn offline_get_serves_mock_entry_or_404() {
    let app = TestApp::offline().await;

    let (status, product) = app.get("/api/products/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Classic Red Roses");
    assert_eq!(product["inStock"], true);

    let (status, _) = app.get("/api/products/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reachable_empty_store_lists_nothing() {
    // With the store reachable, an empty catalog is an empty catalog; mock
    // data is only for store failures.
    let app = TestApp::with_store().await;

    let (status, body) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn product_admin_crud_round_trip() {
    let app = TestApp::with_store().await;

    let (status, created) = app
        .post_json(
            "/api/products",
            json!({
                "name": "Test Bouquet",
                "description": "A bouquet assembled by the test suite.",
                "price": 12.5,
                "category": "mixed",
                "imageUrl": "/images/test-bouquet.png"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["inStock"], true);
    assert_eq!(created["featured"], false);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.get(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&fetched["price"]), dec!(12.5));

    let (status, updated) = app
        .put_json(
            &format!("/api/products/{}", id),
            json!({"price": 20, "featured": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&updated["price"]), dec!(20));
    assert_eq!(updated["featured"], true);
    assert_eq!(updated["name"], "Test Bouquet");

    let (status, listed) = app.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/products/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_product_rejects_negative_price() {
    let app = TestApp::with_store().await;

    let (status, _) = app
        .post_json(
            "/api/products",
            json!({
                "name": "Bad Bouquet",
                "description": "Costs less than nothing.",
                "price": -1,
                "category": "mixed",
                "imageUrl": "/images/bad.png"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
