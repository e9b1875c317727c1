use axum::routing::get;
use axum::{Json, Router};

use crate::AppState;

/// Body of `GET /` for plain HTTP clients.
pub const GREETING: &str = "Halo Dunia";

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub async fn greeting() -> &'static str {
    GREETING
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
