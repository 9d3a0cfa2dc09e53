use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use super::FileService;
use super::types::{
    BulkSummary, CategorySelector, CleanupEntry, CleanupOptions, CleanupReport, ExportFormat,
    FileCategory, FileRecord, OperationOutcome,
};

const MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub file_count: usize,
    pub content: String,
}

impl FileService {
    /// Resolve a scan-produced URL (`/uploads/<category>/<file>`) back to a
    /// validated filesystem path. The category must be a member of the fixed
    /// enum and the filename must be a single path component; both checks run
    /// before any filesystem access.
    pub fn resolve_url(&self, url: &str) -> Result<(FileCategory, String, PathBuf), String> {
        let mut segments = url.trim_start_matches('/').split('/');
        let (prefix, category, file_name) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(prefix), Some(category), Some(file), None) => (prefix, category, file),
            _ => return Err(format!("Invalid file url: {url}")),
        };

        if prefix != "uploads" {
            return Err(format!("Invalid file url: {url}"));
        }

        let category = FileCategory::parse(category)
            .ok_or_else(|| format!("Unsupported category: {category}"))?;

        if file_name.is_empty() || file_name.contains('\\') || file_name.contains("..") {
            return Err(format!("Invalid file name: {file_name}"));
        }

        let path = self
            .uploads_root()
            .join(category.as_str())
            .join(file_name);
        Ok((category, file_name.to_string(), path))
    }

    /// Move a file into another category: copy first, delete the original
    /// only after the copy succeeded.
    pub async fn move_file(&self, url: &str, target: FileCategory) -> Result<String, String> {
        let (source_category, file_name, source_path) = self.resolve_url(url)?;
        if source_category == target {
            return Err(format!(
                "File is already in category {}",
                target.as_str()
            ));
        }

        let target_dir = self.uploads_root().join(target.as_str());
        fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| format!("Failed to prepare target directory: {e}"))?;

        let target_path = target_dir.join(&file_name);
        fs::copy(&source_path, &target_path)
            .await
            .map_err(|e| format!("Failed to copy file: {e}"))?;
        fs::remove_file(&source_path)
            .await
            .map_err(|e| format!("Failed to remove original: {e}"))?;

        Ok(format!("/uploads/{}/{}", target.as_str(), file_name))
    }

    /// Copy a file to an arbitrary relative target directory under the
    /// public root. Absolute targets and `..` components are rejected.
    pub async fn copy_file(&self, url: &str, target_dir: &str) -> Result<String, String> {
        let (_, file_name, source_path) = self.resolve_url(url)?;
        let relative = sanitize_relative_dir(target_dir)?;

        let dest_dir = self.public_root().join(&relative);
        fs::create_dir_all(&dest_dir)
            .await
            .map_err(|e| format!("Failed to prepare target directory: {e}"))?;

        let dest_path = dest_dir.join(&file_name);
        fs::copy(&source_path, &dest_path)
            .await
            .map_err(|e| format!("Failed to copy file: {e}"))?;

        Ok(format!(
            "/{}/{}",
            relative.to_string_lossy().replace('\\', "/"),
            file_name
        ))
    }

    /// Unlink a file, returning the bytes freed.
    pub async fn delete_file(&self, url: &str) -> Result<u64, String> {
        let (_, _, path) = self.resolve_url(url)?;

        let metadata = match fs::metadata(&path).await {
            Ok(md) => md,
            Err(_) => return Err("File not found".to_string()),
        };

        fs::remove_file(&path)
            .await
            .map_err(|e| format!("Failed to delete file: {e}"))?;

        Ok(metadata.len())
    }

    /// Sequential bulk move; a failing item is recorded and the batch
    /// continues.
    pub async fn bulk_move(&self, urls: &[String], target: FileCategory) -> BulkSummary {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            let outcome = match self.move_file(url, target).await {
                Ok(new_url) => OperationOutcome {
                    url: url.clone(),
                    success: true,
                    new_url: Some(new_url),
                    error: None,
                },
                Err(e) => OperationOutcome {
                    url: url.clone(),
                    success: false,
                    new_url: None,
                    error: Some(e),
                },
            };
            results.push(outcome);
        }
        BulkSummary::from_results(results)
    }

    pub async fn bulk_copy(&self, urls: &[String], target_dir: &str) -> BulkSummary {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            let outcome = match self.copy_file(url, target_dir).await {
                Ok(new_url) => OperationOutcome {
                    url: url.clone(),
                    success: true,
                    new_url: Some(new_url),
                    error: None,
                },
                Err(e) => OperationOutcome {
                    url: url.clone(),
                    success: false,
                    new_url: None,
                    error: Some(e),
                },
            };
            results.push(outcome);
        }
        BulkSummary::from_results(results)
    }

    /// Sequential bulk delete, returning the summary plus total bytes freed.
    pub async fn bulk_delete(&self, urls: &[String]) -> (BulkSummary, u64) {
        let mut results = Vec::with_capacity(urls.len());
        let mut freed = 0u64;
        for url in urls {
            let outcome = match self.delete_file(url).await {
                Ok(size) => {
                    freed += size;
                    OperationOutcome {
                        url: url.clone(),
                        success: true,
                        new_url: None,
                        error: None,
                    }
                }
                Err(e) => OperationOutcome {
                    url: url.clone(),
                    success: false,
                    new_url: None,
                    error: Some(e),
                },
            };
            results.push(outcome);
        }
        (BulkSummary::from_results(results), freed)
    }

    /// Delete every file matching the configured age/size thresholds.
    /// `freed_space` is the exact byte sum of what was actually deleted.
    pub async fn cleanup(
        &self,
        selector: CategorySelector,
        options: CleanupOptions,
    ) -> CleanupReport {
        let records = self.scan(selector).await;
        let candidates = cleanup_candidates(&records, &options);

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        let mut freed_space = 0u64;

        for (record, reasons) in candidates {
            match self.delete_file(&record.url).await {
                Ok(size) => {
                    freed_space += size;
                    deleted.push(CleanupEntry {
                        url: record.url.clone(),
                        file_name: record.file_name.clone(),
                        file_size: size,
                        reasons,
                    });
                }
                Err(e) => {
                    warn!("Cleanup failed for {}: {}", record.url, e);
                    failed.push(OperationOutcome {
                        url: record.url.clone(),
                        success: false,
                        new_url: None,
                        error: Some(e),
                    });
                }
            }
        }

        info!(
            "🧹 Cleanup removed {} files, freed {} bytes ({} failures)",
            deleted.len(),
            freed_space,
            failed.len()
        );

        CleanupReport {
            deleted,
            failed,
            freed_space,
        }
    }
}

/// Pure selection step of cleanup: which records match, and why.
pub fn cleanup_candidates<'a>(
    records: &'a [FileRecord],
    options: &CleanupOptions,
) -> Vec<(&'a FileRecord, Vec<String>)> {
    records
        .iter()
        .filter_map(|rec| {
            let mut reasons = Vec::new();
            if options.delete_old_files && rec.file_age_in_days > options.max_age {
                reasons.push(format!(
                    "older than {} days ({} days)",
                    options.max_age, rec.file_age_in_days
                ));
            }
            if options.delete_large_files && rec.file_size as f64 > options.max_size * MB {
                reasons.push(format!(
                    "larger than {} MB ({} bytes)",
                    options.max_size, rec.file_size
                ));
            }
            (!reasons.is_empty()).then_some((rec, reasons))
        })
        .collect()
}

/// Serialize records with a fixed column set.
pub fn export_records(
    records: &[FileRecord],
    format: ExportFormat,
) -> anyhow::Result<ExportPayload> {
    let content = match format {
        ExportFormat::Json => serde_json::to_string_pretty(records)?,
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record([
                "fileName",
                "originalName",
                "category",
                "fileType",
                "mimeType",
                "fileSize",
                "createdAt",
                "modifiedAt",
                "fileAgeInDays",
                "url",
            ])?;
            for rec in records {
                writer.write_record([
                    rec.file_name.as_str(),
                    rec.original_name.as_str(),
                    rec.category.as_str(),
                    rec.file_type.as_str(),
                    rec.mime_type.as_str(),
                    &rec.file_size.to_string(),
                    &rec.created_at.to_rfc3339(),
                    &rec.modified_at.to_rfc3339(),
                    &rec.file_age_in_days.to_string(),
                    rec.url.as_str(),
                ])?;
            }
            let buf = writer
                .into_inner()
                .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))?;
            String::from_utf8(buf)?
        }
    };

    Ok(ExportPayload {
        format,
        file_count: records.len(),
        content,
    })
}

fn sanitize_relative_dir(target: &str) -> Result<PathBuf, String> {
    let trimmed = target.trim();
    if Path::new(trimmed).is_absolute() {
        return Err("Target path must be relative".to_string());
    }

    let trimmed = trimmed.trim_matches('/');
    if trimmed.is_empty() {
        return Err("Target path must not be empty".to_string());
    }

    let path = Path::new(trimmed);
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            _ => return Err(format!("Invalid target path: {target}")),
        }
    }

    Ok(path.to_path_buf())
}
