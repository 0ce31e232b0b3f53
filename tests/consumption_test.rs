mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

async fn issue(app: &TestApp, code: &str, dept_id: i32, quantity: i32) -> serde_json::Value {
    let (status, body) = app
        .post(
            "/api/v1/stock/issue",
            json!({ "code": code, "quantity": quantity, "dept_id": dept_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn first_draw_is_never_flagged() {
    let app = TestApp::new().await;
    app.seed_product("TONER-A", Some("Toner"), 1000).await;
    let dept = app.seed_department("IT").await;

    // No history at all, so even an enormous draw passes.
    let body = issue(&app, "TONER-A", dept.id, 500).await;
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn draw_above_trailing_average_is_flagged() {
    let app = TestApp::new().await;
    app.seed_product("TONER-B", Some("Toner"), 1000).await;
    let dept = app.seed_department("IT").await;

    // Three draws of 10 build an average of 10.
    for _ in 0..3 {
        let body = issue(&app, "TONER-B", dept.id, 10).await;
        assert!(body.get("warning").is_none());
    }

    // 13 exceeds 10 * 1.2 and is 30% above the average.
    let body = issue(&app, "TONER-B", dept.id, 13).await;
    let warning = body.get("warning").expect("warning expected");
    assert_eq!(warning["warning"], true);
    assert_eq!(warning["average"], 10.0);
    assert_eq!(warning["current"], 13);
    assert_eq!(warning["message"], "30% above 1-month average");

    // The flagged sample surfaces as an active alert.
    let (_, flagged) = app
        .get("/api/v1/analytics/consumption?flagged_only=true")
        .await;
    let records = flagged.as_array().expect("array expected");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["quantity"], 13);
}

#[tokio::test]
async fn draw_at_exactly_the_threshold_is_clear() {
    let app = TestApp::new().await;
    app.seed_product("TONER-C", Some("Toner"), 1000).await;
    let dept = app.seed_department("IT").await;

    for _ in 0..3 {
        issue(&app, "TONER-C", dept.id, 10).await;
    }

    // Threshold is strict: 12 == 10 * 1.2 passes.
    let body = issue(&app, "TONER-C", dept.id, 12).await;
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn histories_are_scoped_per_department() {
    let app = TestApp::new().await;
    app.seed_product("TONER-D", Some("Toner"), 1000).await;
    let it = app.seed_department("IT").await;
    let sales = app.seed_department("Sales").await;

    for _ in 0..3 {
        issue(&app, "TONER-D", it.id, 5).await;
    }

    // Sales has no history for this product; its first draw is clear even
    // though it would be far above IT's average.
    let body = issue(&app, "TONER-D", sales.id, 50).await;
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn dismissing_an_alert_clears_the_flag_but_keeps_the_sample() {
    let app = TestApp::new().await;
    app.seed_product("TONER-E", Some("Toner"), 1000).await;
    let dept = app.seed_department("IT").await;

    for _ in 0..3 {
        issue(&app, "TONER-E", dept.id, 10).await;
    }
    issue(&app, "TONER-E", dept.id, 20).await;

    let (_, flagged) = app
        .get("/api/v1/analytics/consumption?flagged_only=true")
        .await;
    let id = flagged[0]["id"].as_i64().expect("alert id");

    let (status, dismissed) = app
        .post(&format!("/api/v1/analytics/consumption/{}/dismiss", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dismissed["is_flagged"], false);

    let (_, flagged) = app
        .get("/api/v1/analytics/consumption?flagged_only=true")
        .await;
    assert_eq!(flagged.as_array().map(Vec::len), Some(0));

    // History is intact: all four samples remain.
    let (_, usage) = app.get("/api/v1/analytics/consumption").await;
    assert_eq!(usage.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn dismissing_unknown_alert_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/v1/analytics/consumption/424242/dismiss", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_counts_reflect_activity() {
    let app = TestApp::new().await;
    // min_threshold is 10, so a stock of 5 counts as low.
    let low = app.seed_product("SKU-LOW", None, 5).await;
    app.seed_product("TONER-F", Some("Toner"), 1000).await;
    let dept = app.seed_department("IT").await;
    app.seed_request(low.id, 5).await;

    for _ in 0..3 {
        issue(&app, "TONER-F", dept.id, 10).await;
    }
    issue(&app, "TONER-F", dept.id, 20).await;

    let (status, stats) = app.get("/api/v1/analytics/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_products"], 2);
    assert_eq!(stats["low_stock_count"], 1);
    assert_eq!(stats["pending_requests"], 1);
    assert_eq!(stats["active_alerts"], 1);
    // Four toner draws of 10+10+10+20 and no receipts.
    assert_eq!(stats["total_issued"], 50);
    assert_eq!(stats["total_received"], 0);
    assert_eq!(stats["total_stock"], 5 + 1000 - 50);
}
