// crates/server/src/routes/root.rs
//! Service greeting at `GET /`.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

async fn read_root() -> Json<Value> {
    Json(json!({ "message": "Hello, Parcelwise!" }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(read_root))
}
