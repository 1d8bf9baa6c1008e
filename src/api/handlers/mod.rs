use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub mod meal_plan;
pub mod recipes;
pub mod users;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Parses an id taken from a path or body, reporting `message` when malformed
pub(crate) fn parse_id(raw: &str, message: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::invalid(message))
}
