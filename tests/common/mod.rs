#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use petalworks_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Test harness wrapping the application router.
///
/// `with_store` backs the app with a file SQLite database in a temp
/// directory; `offline` builds the app without any durable store, which is
/// how the service runs when the store is unreachable at startup.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _tmp: Option<TempDir>,
}

impl TestApp {
    pub async fn with_store() -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = tmp.path().join("petalworks_test.db");
        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1",
            18_080,
            "test",
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::ensure_schema(&pool).await.expect("failed to ensure schema");

        Self::build(Some(Arc::new(pool)), cfg, Some(tmp))
    }

    pub async fn offline() -> Self {
        let cfg = AppConfig::new("sqlite://unused", "127.0.0.1", 18_080, "test");
        Self::build(None, cfg, None)
    }

    fn build(db: Option<Arc<DatabaseConnection>>, cfg: AppConfig, tmp: Option<TempDir>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(events::process_events(event_rx));
        let event_sender = EventSender::new(event_tx);

        let services = AppServices::new(db.clone(), Arc::new(event_sender.clone()), &cfg);
        let state = AppState {
            db,
            config: cfg,
            event_sender,
            services,
        };

        Self {
            router: petalworks_api::app_router(state.clone()),
            state,
            _tmp: tmp,
        }
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn patch_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, None).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

/// A well-formed order payload matching the wire contract.
pub fn order_payload() -> Value {
    serde_json::json!({
        "customerName": "Jane Doe",
        "email": "jane@example.com",
        "phone": "555-0100",
        "shippingAddress": {
            "street": "1 Main St",
            "city": "Springfield",
            "zipCode": "12345"
        },
        "items": [
            { "product": "1", "name": "Classic Red Roses", "quantity": 2, "price": 10 },
            { "product": "2", "quantity": 1, "price": 5 }
        ],
        "totalAmount": 25,
        "notes": "Ring the bell"
    })
}

/// Parses a decimal field serialized as a JSON string.
pub fn decimal_field(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .expect("expected decimal string")
        .parse()
        .expect("expected parsable decimal")
}
