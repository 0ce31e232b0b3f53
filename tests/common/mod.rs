// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use stockroom_api::config::AppConfig;
use stockroom_api::entities::{department, product};
use stockroom_api::events::{self, EventSender};
use stockroom_api::services::departments::NewDepartment;
use stockroom_api::services::products::NewProduct;
use stockroom_api::services::purchase_requests::{
    NewPurchaseRequest, NewRequestItem, RequestWithItems,
};
use stockroom_api::{app, db, AppState};

/// Test harness: a fresh SQLite database in a temp directory, the full
/// router on top, and direct access to the services for seeding.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = db_dir.path().join("stockroom_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (tx, rx) = mpsc::channel(64);
        let event_task = tokio::spawn(events::process_events(rx));
        let event_sender = EventSender::new(tx);

        let state = AppState::new(Arc::new(pool), Arc::new(cfg), event_sender);
        let router = app(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Sends a request through the router and returns status plus parsed
    /// JSON body (Null for empty bodies).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(json.to_string()))
                    .expect("failed to build request")
            }
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error");
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not JSON")
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    // Seeding helpers go straight through the services.

    pub async fn seed_product(
        &self,
        sku: &str,
        category: Option<&str>,
        current_stock: i32,
    ) -> product::Model {
        self.state
            .services
            .products
            .create(NewProduct {
                sku: sku.to_string(),
                supplier_barcode: Some(format!("BAR-{sku}")),
                manufacturer_item_name: format!("Item {sku}"),
                internal_item_name: None,
                category: category.map(str::to_string),
                current_stock,
                min_threshold: 10,
            })
            .await
            .expect("failed to seed product")
    }

    pub async fn seed_department(&self, name: &str) -> department::Model {
        self.state
            .services
            .departments
            .create(NewDepartment {
                name: name.to_string(),
                is_it_department: false,
            })
            .await
            .expect("failed to seed department")
    }

    /// Creates a purchase request with a single line for `product_id`.
    pub async fn seed_request(&self, product_id: i32, requested_qty: i32) -> RequestWithItems {
        self.state
            .services
            .purchase_requests
            .create(NewPurchaseRequest {
                requested_by: Some("tester".to_string()),
                notes: None,
                items: vec![NewRequestItem {
                    product_id,
                    requested_qty,
                    expected_delivery_date: None,
                    supplier_name: None,
                    unit_price: None,
                }],
            })
            .await
            .expect("failed to seed purchase request")
    }
}
