// libs/directory-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::services::DirectoryService;

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);

    let doctors = directory
        .list_doctors()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn list_hospitals(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);

    let hospitals = directory
        .list_hospitals()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(hospitals)))
}
