pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::{AppConfig, MaintenanceState};
use crate::services::audit::AuditService;
use crate::services::file_service::FileService;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::login_user,
        api::handlers::auth::login_admin,
        api::handlers::auth::logout,
        api::handlers::auth::session,
        api::handlers::files::list::list_files,
        api::handlers::files::analytics::file_analytics,
        api::handlers::files::operations::run_operation,
        api::handlers::files::operations::delete_files,
        api::handlers::maintenance::status,
        api::handlers::maintenance::reload,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::UserLoginRequest,
            api::handlers::auth::AdminLoginRequest,
            api::handlers::auth::AuthResponse,
            api::handlers::files::types::AdminFilesResponse,
            api::handlers::files::types::OperationRequest,
            api::handlers::files::types::OperationOptions,
            api::handlers::files::types::BulkDeleteBody,
            api::handlers::maintenance::MaintenanceStatus,
            api::handlers::health::HealthResponse,
            services::auth_service::UserPrincipal,
            services::auth_service::AdminPrincipal,
            services::auth_service::UserRole,
            services::auth_service::AdminRole,
            services::file_service::types::FileRecord,
            services::file_service::types::FileCategory,
            services::file_service::types::FileType,
            services::file_service::types::Pagination,
            services::file_service::types::OperationOutcome,
            services::file_service::types::CleanupEntry,
            services::file_service::analytics::OverviewStats,
            services::file_service::analytics::FileAnalytics,
            services::file_service::analytics::DuplicateGroup,
            services::file_service::analytics::DuplicateKind,
            services::file_service::analytics::CategoryBucket,
            services::file_service::analytics::TypeBucket,
            services::file_service::analytics::SizeDistribution,
            services::file_service::analytics::AgeDistribution,
            services::file_service::analytics::UploadTrends,
            services::file_service::analytics::StorageEfficiency,
        )
    ),
    tags(
        (name = "auth", description = "Session authentication endpoints"),
        (name = "admin-files", description = "Admin file inventory and maintenance endpoints"),
        (name = "system", description = "Health and maintenance-mode endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub files: Arc<FileService>,
    pub audit: AuditService,
    pub maintenance: Arc<MaintenanceState>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            files: Arc::new(FileService::new(
                config.uploads_root.clone(),
                config.public_root.clone(),
            )),
            audit: AuditService::new(db.clone()),
            maintenance: Arc::new(MaintenanceState::new(config.maintenance_mode)),
            db,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let public_root = state.config.public_root.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/api/auth/login", post(api::handlers::auth::login_user))
        .route("/api/auth/logout", post(api::handlers::auth::logout))
        .route("/api/auth/session", get(api::handlers::auth::session))
        .route(
            "/api/admin/auth/login",
            post(api::handlers::auth::login_admin),
        )
        .route("/api/maintenance", get(api::handlers::maintenance::status))
        .route(
            "/api/admin/maintenance/reload",
            post(api::handlers::maintenance::reload),
        )
        .route(
            "/api/admin/files",
            get(api::handlers::files::list_files).delete(api::handlers::files::delete_files),
        )
        .route(
            "/api/admin/files/analytics",
            get(api::handlers::files::file_analytics),
        )
        .route(
            "/api/admin/files/operations",
            post(api::handlers::files::run_operation),
        )
        .fallback_service(ServeDir::new(public_root))
        .layer(from_fn_with_state(
            state.clone(),
            api::middleware::gate::request_gate,
        ))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
