use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fixed upload categories. Every path the file subsystem touches is rooted
/// in one of these; anything else is rejected before filesystem access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FileCategory {
    Images,
    Documents,
    CoverImages,
}

impl FileCategory {
    pub const ALL: [FileCategory; 3] = [
        FileCategory::Images,
        FileCategory::Documents,
        FileCategory::CoverImages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Images => "images",
            FileCategory::Documents => "documents",
            FileCategory::CoverImages => "cover-images",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "images" => Some(FileCategory::Images),
            "documents" => Some(FileCategory::Documents),
            "cover-images" => Some(FileCategory::CoverImages),
            _ => None,
        }
    }
}

/// Scan scope: one category or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelector {
    All,
    One(FileCategory),
}

impl CategorySelector {
    /// `None` and `"all"` mean every category; anything else must be a
    /// member of the fixed enum.
    pub fn parse(s: Option<&str>) -> Option<Self> {
        match s {
            None | Some("all") => Some(CategorySelector::All),
            Some(other) => FileCategory::parse(other).map(CategorySelector::One),
        }
    }

    pub fn categories(&self) -> Vec<FileCategory> {
        match self {
            CategorySelector::All => FileCategory::ALL.to_vec(),
            CategorySelector::One(c) => vec![*c],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Document,
    Video,
    Audio,
    Unknown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Document => "document",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Unknown => "unknown",
        }
    }
}

/// Per-file metadata record, rebuilt from stat calls on every request.
/// The filesystem itself is the source of truth; records are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_name: String,
    pub original_name: String,
    pub url: String,
    pub file_size: u64,
    pub file_type: FileType,
    pub mime_type: String,
    pub category: FileCategory,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub file_age_in_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Name,
    Size,
    Category,
    #[serde(rename = "type")]
    Type,
    Age,
    ModifiedAt,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// In-memory filter over a scanned record set. All bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub search: Option<String>,
    pub file_type: Option<FileType>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub size_min_mb: Option<f64>,
    pub size_max_mb: Option<f64>,
    pub age_min_days: Option<i64>,
    pub age_max_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Outcome of one item inside a bulk operation. Failures are captured here
/// instead of aborting the batch.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub results: Vec<OperationOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkSummary {
    pub fn from_results(results: Vec<OperationOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        Self {
            results,
            succeeded,
            failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CleanupOptions {
    pub delete_old_files: bool,
    pub max_age: i64, // days
    pub delete_large_files: bool,
    pub max_size: f64, // MB
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupEntry {
    pub url: String,
    pub file_name: String,
    pub file_size: u64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub deleted: Vec<CleanupEntry>,
    pub failed: Vec<OperationOutcome>,
    pub freed_space: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}
