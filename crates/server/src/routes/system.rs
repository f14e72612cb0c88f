use axum::{http::StatusCode, Json};
use common::types::Health;

use crate::metrics;

pub const WELCOME: &str = "Welcome to the Lens API";

pub async fn welcome() -> &'static str {
    WELCOME
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics_handler() -> (StatusCode, String) {
    metrics::encode_metrics()
}
