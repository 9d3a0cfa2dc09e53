use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uploads: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = if state.db.ping().await.is_ok() {
        "connected"
    } else {
        "disconnected"
    };

    let uploads_status = if state.files.uploads_root().is_dir() {
        "available"
    } else {
        // Created lazily on the first scan, so absence is not an error
        "uninitialized"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: db_status.to_string(),
        uploads: uploads_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
