mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn timeline_starts_with_creation_and_appends_receipts_in_order() {
    let app = TestApp::new().await;
    let product = app.seed_product("SKU-T1", None, 0).await;
    let created = app.seed_request(product.id, 10).await;
    let item_id = created.items[0].id;

    let (status, timeline) = app
        .get(&format!("/api/v1/receiving/item/{}/timeline", item_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let events = timeline.as_array().expect("array expected");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "created");
    assert_eq!(
        events[0]["request_qr"],
        format!("REQ_{}", created.request.id)
    );

    app.post(
        "/api/v1/receiving",
        json!({
            "purchase_request_item_id": item_id,
            "received_qty": 4,
            "received_by": "bob"
        }),
    )
    .await;

    let (_, timeline) = app
        .get(&format!("/api/v1/receiving/item/{}/timeline", item_id))
        .await;
    let events = timeline.as_array().expect("array expected");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1]["event"], "received");
    assert_eq!(events[1]["quantity"], 4);
    assert_eq!(events[1]["received_by"], "bob");
    assert_eq!(events[1]["is_damaged"], false);
}

#[tokio::test]
async fn completed_marker_appears_once_the_line_is_covered() {
    let app = TestApp::new().await;
    let product = app.seed_product("SKU-T2", None, 0).await;
    let created = app.seed_request(product.id, 10).await;
    let item_id = created.items[0].id;

    app.post(
        "/api/v1/receiving",
        json!({ "purchase_request_item_id": item_id, "received_qty": 4 }),
    )
    .await;
    app.post(
        "/api/v1/receiving",
        json!({ "purchase_request_item_id": item_id, "received_qty": 6 }),
    )
    .await;

    let (_, timeline) = app
        .get(&format!("/api/v1/receiving/item/{}/timeline", item_id))
        .await;
    let events = timeline.as_array().expect("array expected");
    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["event"], "created");
    assert_eq!(events[1]["event"], "received");
    assert_eq!(events[2]["event"], "received");
    assert_eq!(events[3]["event"], "completed");

    // The completion marker carries the date of the final receipt.
    assert_eq!(events[3]["date"], events[2]["date"]);
}

#[tokio::test]
async fn damaged_receipts_are_visible_in_the_timeline() {
    let app = TestApp::new().await;
    let product = app.seed_product("SKU-T3", None, 0).await;
    let created = app.seed_request(product.id, 5).await;
    let item_id = created.items[0].id;

    app.post(
        "/api/v1/receiving",
        json!({
            "purchase_request_item_id": item_id,
            "received_qty": 2,
            "is_damaged": true,
            "damage_notes": "crushed carton"
        }),
    )
    .await;

    let (_, timeline) = app
        .get(&format!("/api/v1/receiving/item/{}/timeline", item_id))
        .await;
    assert_eq!(timeline[1]["is_damaged"], true);
}

#[tokio::test]
async fn timeline_is_sorted_by_date_even_for_backdated_receipts() {
    use chrono::{Duration, Utc};
    use sea_orm::{ActiveModelTrait, ActiveValue::Set};
    use stockroom_api::entities::receiving_transaction;

    let app = TestApp::new().await;
    let product = app.seed_product("SKU-T4", None, 0).await;
    let created = app.seed_request(product.id, 5).await;
    let item_id = created.items[0].id;

    // A receipt keyed in after the fact with a date before the request
    // itself existed.
    receiving_transaction::ActiveModel {
        purchase_request_item_id: Set(item_id),
        received_qty: Set(2),
        received_date: Set(Utc::now() - Duration::days(3)),
        received_by: Set(Some("carol".to_string())),
        is_damaged: Set(false),
        damage_notes: Set(None),
        photo_url: Set(None),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await
    .expect("failed to insert backdated receipt");

    let (status, timeline) = app
        .get(&format!("/api/v1/receiving/item/{}/timeline", item_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let events = timeline.as_array().expect("array expected");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "received");
    assert_eq!(events[1]["event"], "created");
}

#[tokio::test]
async fn timeline_for_unknown_item_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/v1/receiving/item/777/timeline").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
