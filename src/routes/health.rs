use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub database: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Database ping failed: {}", e);
            false
        }
    };

    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}
