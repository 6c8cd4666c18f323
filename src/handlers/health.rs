use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use http::StatusCode;
use serde_json::{json, Value};
use tracing::info;

use crate::{models::error::Error, utils::state::AppState};

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"message": "curator is running"})))
}

pub async fn test_connection(State(state): State<Arc<AppState>>) -> Result<Json<Value>, Error> {
    info!("Testing document store connection...");
    state
        .store
        .get()
        .await
        .map_err(|e| Error::store("Connection failed", e))?;
    Ok(Json(json!({"status": "Connected successfully to document store"})))
}
