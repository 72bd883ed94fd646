use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe. Deliberately a fixed payload: the service stays up and
/// keeps accepting orders even while the durable store is unreachable.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running")
    )
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Petalworks storefront API is running"
    }))
}
