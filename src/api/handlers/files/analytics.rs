use crate::api::error::AppError;
use crate::services::file_service::analytics;
use crate::services::file_service::types::CategorySelector;
use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::{Value, json};

use super::types::*;

#[utoipa::path(
    get,
    path = "/api/admin/files/analytics",
    params(
        ("type" = Option<String>, Query, description = "overview|duplicates|trends|storage"),
        ("category" = Option<String>, Query, description = "Category or \"all\"")
    ),
    responses(
        (status = 200, description = "Analytics over the current inventory; shape varies by type"),
        (status = 400, description = "Unsupported category"),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = [])),
    tag = "admin-files"
)]
pub async fn file_analytics(
    State(state): State<crate::AppState>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<Value>, AppError> {
    let selector = CategorySelector::parse(params.category.as_deref()).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported category: {}",
            params.category.as_deref().unwrap_or_default()
        ))
    })?;

    let records = state.files.scan(selector).await;

    let body = match params.analytics_type.unwrap_or(AnalyticsType::Overview) {
        AnalyticsType::Overview => json!({
            "type": "overview",
            "overview": analytics::overview(&records),
            "byCategory": analytics::by_category(&records),
            "byType": analytics::by_type(&records),
            "sizeDistribution": analytics::size_distribution(&records),
            "ageDistribution": analytics::age_distribution(&records),
        }),
        AnalyticsType::Duplicates => {
            let duplicates = analytics::find_duplicates(&records);
            let potential_savings: u64 = duplicates.iter().map(|g| g.savings).sum();
            json!({
                "type": "duplicates",
                "duplicates": duplicates,
                "potentialSavings": potential_savings,
            })
        }
        AnalyticsType::Trends => json!({
            "type": "trends",
            "trends": analytics::trends(&records),
        }),
        AnalyticsType::Storage => {
            let overview = analytics::overview(&records);
            let storage = analytics::storage_efficiency(&records);
            let recommendations = analytics::recommendations(&records, &overview, &storage);
            json!({
                "type": "storage",
                "storage": storage,
                "recommendations": recommendations,
            })
        }
    };

    Ok(Json(body))
}
