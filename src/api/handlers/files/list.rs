use crate::api::error::AppError;
use crate::services::file_service::types::{CategorySelector, FileFilter, SortBy, SortOrder};
use crate::services::file_service::{analytics, query};
use axum::{
    Json,
    extract::{Query, State},
};

use super::types::*;

const DEFAULT_PAGE_LIMIT: u64 = 50;

#[utoipa::path(
    get,
    path = "/api/admin/files",
    params(
        ("category" = Option<String>, Query, description = "Category or \"all\""),
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u64>, Query, description = "Page size"),
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("fileType" = Option<String>, Query, description = "image|document|video|audio|unknown"),
        ("sortBy" = Option<String>, Query, description = "Sort key, default createdAt"),
        ("order" = Option<String>, Query, description = "asc|desc, default desc"),
        ("analytics" = Option<bool>, Query, description = "Include full analytics"),
        ("duplicates" = Option<bool>, Query, description = "Include duplicate groups")
    ),
    responses(
        (status = 200, description = "Filtered, sorted and paginated file inventory", body = AdminFilesResponse),
        (status = 400, description = "Unsupported category"),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = [])),
    tag = "admin-files"
)]
pub async fn list_files(
    State(state): State<crate::AppState>,
    Query(params): Query<AdminFilesQuery>,
) -> Result<Json<AdminFilesResponse>, AppError> {
    let selector = CategorySelector::parse(params.category.as_deref()).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported category: {}",
            params.category.as_deref().unwrap_or_default()
        ))
    })?;

    let records = state.files.scan(selector).await;

    let filter = FileFilter {
        search: params.search,
        file_type: params.file_type,
        date_from: params.date_from,
        date_to: params.date_to,
        size_min_mb: params.size_min,
        size_max_mb: params.size_max,
        age_min_days: params.age_min,
        age_max_days: params.age_max,
    };
    let mut filtered = query::filter_records(records, &filter);
    query::sort_records(
        &mut filtered,
        params.sort_by.unwrap_or(SortBy::CreatedAt),
        params.order.unwrap_or(SortOrder::Desc),
    );

    // Stats and analytics describe the whole filtered set, not one page
    let stats = analytics::overview(&filtered);
    let full_analytics = params
        .analytics
        .unwrap_or(false)
        .then(|| analytics::analyze(&filtered));
    let duplicates = params
        .duplicates
        .unwrap_or(false)
        .then(|| analytics::find_duplicates(&filtered));

    let (files, pagination) = query::paginate(
        filtered,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    );

    Ok(Json(AdminFilesResponse {
        files,
        pagination,
        stats,
        analytics: full_analytics,
        duplicates,
    }))
}
