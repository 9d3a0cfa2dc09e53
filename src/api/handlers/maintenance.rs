use crate::AppState;
use crate::services::audit::AuditEventType;
use crate::utils::auth::SessionClaims;
use axum::{Extension, Json, extract::State};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct MaintenanceStatus {
    pub maintenance: bool,
}

#[utoipa::path(
    get,
    path = "/api/maintenance",
    responses(
        (status = 200, description = "Current maintenance-mode flag", body = MaintenanceStatus)
    ),
    tag = "system"
)]
pub async fn status(State(state): State<AppState>) -> Json<MaintenanceStatus> {
    Json(MaintenanceStatus {
        maintenance: state.maintenance.is_enabled(),
    })
}

#[utoipa::path(
    post,
    path = "/api/admin/maintenance/reload",
    responses(
        (status = 200, description = "Flag re-read from the environment", body = MaintenanceStatus),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = [])),
    tag = "system"
)]
pub async fn reload(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<MaintenanceStatus> {
    let enabled = state.maintenance.reload_from_env();
    info!("🔧 Maintenance mode reloaded: {}", enabled);

    state
        .audit
        .log(
            AuditEventType::MaintenanceReload,
            Some(claims.principal.id().to_string()),
            None,
            "reload",
            "success",
            Some(serde_json::json!({ "maintenance": enabled })),
        )
        .await;

    Json(MaintenanceStatus { maintenance: enabled })
}
