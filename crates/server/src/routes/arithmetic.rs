// crates/server/src/routes/arithmetic.rs
//! Path-parameter arithmetic demo endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OperationResult {
    pub operation: &'static str,
    pub result: f64,
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Arithmetic API" }))
}

/// Extract both operands; anything that is not a finite number is a 422.
fn operands(path: Result<Path<(f64, f64)>, PathRejection>) -> ApiResult<(f64, f64)> {
    let Path((a, b)) = path?;
    if !a.is_finite() || !b.is_finite() {
        return Err(ApiError::Validation(
            "Operands must be finite numbers".to_string(),
        ));
    }
    Ok((a, b))
}

async fn add(path: Result<Path<(f64, f64)>, PathRejection>) -> ApiResult<Json<OperationResult>> {
    let (a, b) = operands(path)?;
    Ok(Json(OperationResult {
        operation: "addition",
        result: a + b,
    }))
}

async fn subtract(
    path: Result<Path<(f64, f64)>, PathRejection>,
) -> ApiResult<Json<OperationResult>> {
    let (a, b) = operands(path)?;
    Ok(Json(OperationResult {
        operation: "subtraction",
        result: a - b,
    }))
}

async fn multiply(
    path: Result<Path<(f64, f64)>, PathRejection>,
) -> ApiResult<Json<OperationResult>> {
    let (a, b) = operands(path)?;
    Ok(Json(OperationResult {
        operation: "multiplication",
        result: a * b,
    }))
}

async fn divide(
    path: Result<Path<(f64, f64)>, PathRejection>,
) -> ApiResult<Json<OperationResult>> {
    let (a, b) = operands(path)?;
    if b == 0.0 {
        return Err(ApiError::BadRequest("Cannot divide by zero".to_string()));
    }
    Ok(Json(OperationResult {
        operation: "division",
        result: a / b,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/arithmetic", get(welcome))
        .route("/arithmetic/add/{a}/{b}", get(add))
        .route("/arithmetic/subtract/{a}/{b}", get(subtract))
        .route("/arithmetic/multiply/{a}/{b}", get(multiply))
        .route("/arithmetic/divide/{a}/{b}", get(divide))
}
