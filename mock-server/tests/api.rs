use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Due, Product, Sale};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

const MILK: &str = r#"{"sku":"MILK-500","name":"Milk 500ml","category":"Dairy","stock":3,"price":70,"reorder_point":5}"#;

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["ok"], true);
}

// --- products ---

#[tokio::test]
async fn list_products_empty() {
    let resp = app().oneshot(get("/api/v1/products")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Product> = body_json(resp).await;
    assert!(products.is_empty());
}

#[tokio::test]
async fn create_product_returns_row() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/products", MILK))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let product: Product = body_json(resp).await;
    assert_eq!(product.id, 1);
    assert_eq!(product.sku, "MILK-500");
    assert_eq!(product.stock, 3);
}

#[tokio::test]
async fn create_product_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/products", r#"{"name":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn rejected_batch_leaves_products_unchanged() {
    use tower::Service;

    let mut app = app().into_service();
    ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/v1/products", MILK))
        .await
        .unwrap();

    let batches = [
        r#"{"items":[{"sku":"A","name":"Apples"},{"sku":"A","name":"Apricots"}]}"#,
        r#"{"items":[{"sku":"B","name":"Bread"},{"sku":" MILK-500 ","name":"Milk again"}]}"#,
    ];
    for batch in batches {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/api/v1/products/batch", batch))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = body_json(resp).await;
        assert_eq!(body["detail"], "SKU already exists");
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v1/products"))
        .await
        .unwrap();
    let products: Vec<Product> = body_json(resp).await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku, "MILK-500");
}

#[tokio::test]
async fn update_missing_product_returns_detail() {
    let resp = app()
        .oneshot(json_request("PATCH", "/api/v1/products/42", r#"{"stock":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Product not found");
}

#[tokio::test]
async fn settle_missing_due_returns_detail() {
    let resp = app()
        .oneshot(json_request("PATCH", "/api/v1/dues/1", r#"{"is_settled":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Due not found");
}

#[tokio::test]
async fn sales_series_rejects_out_of_range_days() {
    let resp = app()
        .oneshot(get("/api/v1/reports/sales-series?days=0"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn sales_series_zero_fills_each_day() {
    let resp = app()
        .oneshot(get("/api/v1/reports/sales-series?days=7"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let points: Vec<Value> = body_json(resp).await;
    assert_eq!(points.len(), 7);
    assert!(points.iter().all(|p| p["value"] == 0.0));
}

#[tokio::test]
async fn report_limits_are_range_checked() {
    for uri in [
        "/api/v1/reports/top-products?limit=0",
        "/api/v1/reports/top-products?limit=21",
        "/api/v1/reports/recent?limit=0",
        "/api/v1/reports/recent?limit=51",
    ] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
}

#[tokio::test]
async fn empty_store_reports_are_empty_lists() {
    for uri in [
        "/api/v1/reports/top-products",
        "/api/v1/reports/category-share",
        "/api/v1/reports/recent",
    ] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let rows: Vec<Value> = body_json(resp).await;
        assert!(rows.is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn forecast_for_missing_product_returns_detail() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/forecast", r#"{"product_id":9,"horizon_days":7}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Product not found");
}

#[tokio::test]
async fn forecast_rejects_out_of_range_horizon() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/forecast", r#"{"product_id":1,"horizon_days":61}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- full shop lifecycle ---

#[tokio::test]
async fn sale_and_due_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create product
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/v1/products", MILK))
        .await
        .unwrap();
    let milk: Product = body_json(resp).await;

    // oversell is rejected before stock moves
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/sales",
            &format!(r#"{{"product_id":{},"qty":10,"unit_price":70}}"#, milk.id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Insufficient stock");

    // credit sale
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/sales",
            &format!(
                r#"{{"product_id":{},"qty":2,"unit_price":70,"is_credit":true,"customer_name":"Asha"}}"#,
                milk.id
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let sale: Sale = body_json(resp).await;
    assert_eq!(sale.product_name, "Milk 500ml");
    assert!(sale.is_credit);

    // stock decremented
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v1/products"))
        .await
        .unwrap();
    let products: Vec<Product> = body_json(resp).await;
    assert_eq!(products[0].stock, 1);

    // credit sale opened a due
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v1/dues"))
        .await
        .unwrap();
    let dues: Vec<Due> = body_json(resp).await;
    assert_eq!(dues.len(), 1);
    assert_eq!(dues[0].customer_name, "Asha");
    assert_eq!(dues[0].amount, 140.0);
    assert!(!dues[0].is_settled);

    // summary reflects the sale, the due and the low stock
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v1/reports/summary"))
        .await
        .unwrap();
    let summary: Value = body_json(resp).await;
    assert_eq!(summary["today_sales"], 140.0);
    assert_eq!(summary["pending_dues"], 140.0);
    assert_eq!(summary["low_stock"], 1);
    assert_eq!(summary["top_product"]["name"], "Milk 500ml");

    // revenue breakdowns
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v1/reports/top-products?limit=1"))
        .await
        .unwrap();
    let top: Vec<Value> = body_json(resp).await;
    assert_eq!(top, vec![serde_json::json!({"name": "Milk 500ml", "revenue": 140.0})]);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v1/reports/category-share"))
        .await
        .unwrap();
    let shares: Vec<Value> = body_json(resp).await;
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0]["category"], "Dairy");
    assert_eq!(shares[0]["pct"], 100.0);

    // the credit sale and its due both show in the feed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/v1/reports/recent?limit=5"))
        .await
        .unwrap();
    let feed: Vec<mock_server::ActivityItem> = body_json(resp).await;
    let mut kinds: Vec<&str> = feed.iter().map(|item| item.kind.as_str()).collect();
    kinds.sort_unstable();
    assert_eq!(kinds, ["due", "sale"]);
    assert!(feed.iter().any(|item| item.title == "Sold 2 × Milk 500ml" && item.subtitle == "Credit"));
    assert!(feed.iter().any(|item| item.title == "Due: Asha" && item.subtitle == "Pending"));

    // forecast from the one recorded sale
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/forecast",
            &format!(r#"{{"product_id":{},"horizon_days":3}}"#, milk.id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let forecast: Value = body_json(resp).await;
    let points = forecast["points"].as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["forecast_qty"], 2.0);

    // settle
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/api/v1/dues/{}", dues[0].id),
            r#"{"is_settled":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let settled: Due = body_json(resp).await;
    assert!(settled.is_settled);

    // delete product
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/products/{}", milk.id))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["ok"], true);
}
