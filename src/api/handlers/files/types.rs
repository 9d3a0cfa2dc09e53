use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::file_service::analytics::{DuplicateGroup, FileAnalytics, OverviewStats};
use crate::services::file_service::types::{
    CleanupOptions, ExportFormat, FileRecord, FileType, Pagination, SortBy, SortOrder,
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminFilesQuery {
    pub category: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub size_min: Option<f64>, // MB
    pub size_max: Option<f64>,
    pub age_min: Option<i64>, // days
    pub age_max: Option<i64>,
    pub file_type: Option<FileType>,
    pub sort_by: Option<SortBy>,
    pub order: Option<SortOrder>,
    pub analytics: Option<bool>,
    pub duplicates: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminFilesResponse {
    pub files: Vec<FileRecord>,
    pub pagination: Pagination,
    pub stats: OverviewStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<FileAnalytics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<Vec<DuplicateGroup>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsType {
    Overview,
    Duplicates,
    Trends,
    Storage,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(rename = "type")]
    pub analytics_type: Option<AnalyticsType>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Move,
    Copy,
    Delete,
    Cleanup,
    Export,
}

/// Operation-specific knobs; each operation reads the subset it needs and
/// rejects the request when a required one is missing.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationOptions {
    /// Move: destination category (member of the fixed enum)
    pub target_category: Option<String>,
    /// Copy: relative destination directory under the public root
    pub target_path: Option<String>,
    /// Cleanup/export scope ("all" or one category)
    pub category: Option<String>,
    /// Export serialization format
    pub format: Option<ExportFormat>,
    pub delete_old_files: Option<bool>,
    pub max_age: Option<i64>, // days
    pub delete_large_files: Option<bool>,
    pub max_size: Option<f64>, // MB
}

impl OperationOptions {
    pub fn cleanup_options(&self) -> CleanupOptions {
        CleanupOptions {
            delete_old_files: self.delete_old_files.unwrap_or(false),
            max_age: self.max_age.unwrap_or(0),
            delete_large_files: self.delete_large_files.unwrap_or(false),
            max_size: self.max_size.unwrap_or(0.0),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub operation: OperationKind,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub options: OperationOptions,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub url: Option<String>,
    pub bulk: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteBody {
    pub file_urls: Vec<String>,
}
