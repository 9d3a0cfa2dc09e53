use crate::api::error::AppError;
use crate::services::audit::AuditEventType;
use crate::services::file_service::operations::export_records;
use crate::services::file_service::types::{CategorySelector, ExportFormat, FileCategory};
use crate::utils::auth::SessionClaims;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde_json::{Value, json};

use super::types::*;

#[utoipa::path(
    post,
    path = "/api/admin/files/operations",
    request_body = OperationRequest,
    responses(
        (status = 200, description = "Operation result envelope; shape varies by operation"),
        (status = 400, description = "Missing required fields or unsupported category"),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = [])),
    tag = "admin-files"
)]
pub async fn run_operation(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(request): Json<OperationRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = claims.principal.id().to_string();

    match request.operation {
        OperationKind::Move => {
            let target = request
                .options
                .target_category
                .as_deref()
                .ok_or_else(|| AppError::BadRequest("targetCategory is required".into()))?;
            let target = FileCategory::parse(target)
                .ok_or_else(|| AppError::BadRequest(format!("Unsupported category: {target}")))?;
            require_files(&request.files)?;

            let summary = state.files.bulk_move(&request.files, target).await;
            state
                .audit
                .log(
                    AuditEventType::FileMove,
                    Some(actor),
                    Some(target.as_str().to_string()),
                    "bulk_move",
                    outcome_status(summary.failed),
                    Some(json!({ "requested": request.files.len(), "moved": summary.succeeded })),
                )
                .await;

            Ok(Json(json!({
                "success": summary.failed == 0,
                "message": format!(
                    "Moved {}/{} files to {}",
                    summary.succeeded,
                    summary.results.len(),
                    target.as_str()
                ),
                "results": summary.results,
                "succeeded": summary.succeeded,
                "failed": summary.failed,
            })))
        }

        OperationKind::Copy => {
            let target = request
                .options
                .target_path
                .as_deref()
                .ok_or_else(|| AppError::BadRequest("targetPath is required".into()))?;
            require_files(&request.files)?;

            let summary = state.files.bulk_copy(&request.files, target).await;
            state
                .audit
                .log(
                    AuditEventType::FileCopy,
                    Some(actor),
                    Some(target.to_string()),
                    "bulk_copy",
                    outcome_status(summary.failed),
                    Some(json!({ "requested": request.files.len(), "copied": summary.succeeded })),
                )
                .await;

            Ok(Json(json!({
                "success": summary.failed == 0,
                "message": format!(
                    "Copied {}/{} files to {}",
                    summary.succeeded,
                    summary.results.len(),
                    target
                ),
                "results": summary.results,
                "succeeded": summary.succeeded,
                "failed": summary.failed,
            })))
        }

        OperationKind::Delete => {
            require_files(&request.files)?;

            let (summary, freed_space) = state.files.bulk_delete(&request.files).await;
            state
                .audit
                .log(
                    AuditEventType::FileDelete,
                    Some(actor),
                    None,
                    "bulk_delete",
                    outcome_status(summary.failed),
                    Some(json!({ "requested": request.files.len(), "freedSpace": freed_space })),
                )
                .await;

            Ok(Json(json!({
                "success": summary.failed == 0,
                "message": format!(
                    "Deleted {}/{} files",
                    summary.succeeded,
                    summary.results.len()
                ),
                "results": summary.results,
                "succeeded": summary.succeeded,
                "failed": summary.failed,
                "freedSpace": freed_space,
            })))
        }

        OperationKind::Cleanup => {
            let options = request.options.cleanup_options();
            if !options.delete_old_files && !options.delete_large_files {
                return Err(AppError::BadRequest(
                    "No cleanup criteria specified".into(),
                ));
            }
            let selector = parse_selector(request.options.category.as_deref())?;

            let report = state.files.cleanup(selector, options).await;
            state
                .audit
                .log(
                    AuditEventType::FileCleanup,
                    Some(actor),
                    None,
                    "cleanup",
                    outcome_status(report.failed.len()),
                    Some(json!({
                        "deleted": report.deleted.len(),
                        "freedSpace": report.freed_space
                    })),
                )
                .await;

            Ok(Json(json!({
                "success": report.failed.is_empty(),
                "message": format!(
                    "Cleanup removed {} files, freed {} bytes",
                    report.deleted.len(),
                    report.freed_space
                ),
                "deleted": report.deleted,
                "failed": report.failed,
                "freedSpace": report.freed_space,
            })))
        }

        OperationKind::Export => {
            let selector = parse_selector(request.options.category.as_deref())?;
            let format = request.options.format.unwrap_or(ExportFormat::Json);

            let records = state.files.scan(selector).await;
            let payload =
                export_records(&records, format).map_err(|e| AppError::Internal(e.to_string()))?;
            state
                .audit
                .log(
                    AuditEventType::FileExport,
                    Some(actor),
                    None,
                    "export",
                    "success",
                    Some(json!({ "fileCount": payload.file_count })),
                )
                .await;

            Ok(Json(json!({
                "success": true,
                "message": format!("Exported {} files", payload.file_count),
                "export": payload,
            })))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/files",
    params(
        ("url" = Option<String>, Query, description = "Single file url"),
        ("bulk" = Option<bool>, Query, description = "Bulk mode; urls come from the JSON body")
    ),
    responses(
        (status = 200, description = "Deletion summary"),
        (status = 400, description = "Missing url(s)"),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = [])),
    tag = "admin-files"
)]
pub async fn delete_files(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(params): Query<DeleteQuery>,
    body: Option<Json<BulkDeleteBody>>,
) -> Result<Json<Value>, AppError> {
    let urls = if params.bulk.unwrap_or(false) {
        let Json(body) = body.ok_or_else(|| AppError::BadRequest("fileUrls is required".into()))?;
        if body.file_urls.is_empty() {
            return Err(AppError::BadRequest("fileUrls is required".into()));
        }
        body.file_urls
    } else {
        let url = params
            .url
            .ok_or_else(|| AppError::BadRequest("url is required".into()))?;
        vec![url]
    };

    let (summary, freed_space) = state.files.bulk_delete(&urls).await;

    state
        .audit
        .log(
            AuditEventType::FileDelete,
            Some(claims.principal.id().to_string()),
            None,
            "delete",
            outcome_status(summary.failed),
            Some(json!({ "requested": urls.len(), "freedSpace": freed_space })),
        )
        .await;

    Ok(Json(json!({
        "success": summary.failed == 0,
        "message": format!(
            "Deleted {}/{} files",
            summary.succeeded,
            summary.results.len()
        ),
        "results": summary.results,
        "succeeded": summary.succeeded,
        "failed": summary.failed,
        "freedSpace": freed_space,
    })))
}

fn require_files(files: &[String]) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::BadRequest("No files provided".into()));
    }
    Ok(())
}

fn parse_selector(category: Option<&str>) -> Result<CategorySelector, AppError> {
    CategorySelector::parse(category).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported category: {}",
            category.unwrap_or_default()
        ))
    })
}

fn outcome_status(failed: usize) -> &'static str {
    if failed == 0 { "success" } else { "partial" }
}
