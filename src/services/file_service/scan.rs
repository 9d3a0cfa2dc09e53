use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::fs;
use tracing::{error, warn};

use super::FileService;
use super::types::{CategorySelector, FileCategory, FileRecord, FileType};

/// Junk filenames ignored alongside dotfiles
const SKIPPED_FILES: [&str; 2] = [".gitkeep", "Thumbs.db"];

impl FileService {
    /// Enumerate every regular file in the selected categories. Categories
    /// are scanned independently; a failing category contributes zero
    /// records instead of aborting the whole scan.
    pub async fn scan(&self, selector: CategorySelector) -> Vec<FileRecord> {
        let mut records = Vec::new();
        for category in selector.categories() {
            records.extend(self.scan_category(category).await);
        }
        records
    }

    pub async fn scan_category(&self, category: FileCategory) -> Vec<FileRecord> {
        let dir = self.uploads_root.join(category.as_str());

        // First-run scans never error: a missing category directory is
        // created empty and reported as such.
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(&dir).await {
                error!("Failed to create category directory {:?}: {}", dir, e);
            }
            return Vec::new();
        }

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to read category directory {:?}: {}", dir, e);
                return Vec::new();
            }
        };

        let now = Utc::now();
        let mut records = Vec::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to iterate {:?}: {}", dir, e);
                    break;
                }
            };

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.starts_with('.') || SKIPPED_FILES.contains(&file_name.as_str()) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(md) => md,
                Err(e) => {
                    warn!("Skipping {:?}: stat failed: {}", entry.path(), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            // Birth time is unavailable on some filesystems; mtime is the
            // closest stand-in.
            let created_at: DateTime<Utc> = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::from)
                .unwrap_or(now);
            let modified_at: DateTime<Utc> =
                metadata.modified().map(DateTime::from).unwrap_or(created_at);

            let (file_type, mime_type) = classify_extension(extension_of(&file_name));

            records.push(FileRecord {
                original_name: strip_upload_suffix(&file_name),
                url: format!("/uploads/{}/{}", category.as_str(), file_name),
                file_name,
                file_size: metadata.len(),
                file_type,
                mime_type: mime_type.to_string(),
                category,
                created_at,
                modified_at,
                file_age_in_days: (now - created_at).num_days(),
            });
        }

        records
    }
}

fn extension_of(file_name: &str) -> &str {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// Fixed extension table; anything unlisted is unknown/octet-stream.
pub fn classify_extension(ext: &str) -> (FileType, &'static str) {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => (FileType::Image, "image/jpeg"),
        "png" => (FileType::Image, "image/png"),
        "gif" => (FileType::Image, "image/gif"),
        "webp" => (FileType::Image, "image/webp"),
        "svg" => (FileType::Image, "image/svg+xml"),
        "bmp" => (FileType::Image, "image/bmp"),

        "pdf" => (FileType::Document, "application/pdf"),
        "doc" => (FileType::Document, "application/msword"),
        "docx" => (
            FileType::Document,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        "xls" => (FileType::Document, "application/vnd.ms-excel"),
        "xlsx" => (
            FileType::Document,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ),
        "ppt" => (FileType::Document, "application/vnd.ms-powerpoint"),
        "pptx" => (
            FileType::Document,
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ),
        "txt" => (FileType::Document, "text/plain"),
        "md" => (FileType::Document, "text/markdown"),
        "csv" => (FileType::Document, "text/csv"),
        "rtf" => (FileType::Document, "application/rtf"),

        "mp4" => (FileType::Video, "video/mp4"),
        "mpeg" => (FileType::Video, "video/mpeg"),
        "webm" => (FileType::Video, "video/webm"),
        "mov" => (FileType::Video, "video/quicktime"),
        "avi" => (FileType::Video, "video/x-msvideo"),

        "mp3" => (FileType::Audio, "audio/mpeg"),
        "wav" => (FileType::Audio, "audio/wav"),
        "ogg" => (FileType::Audio, "audio/ogg"),
        "flac" => (FileType::Audio, "audio/flac"),
        "aac" => (FileType::Audio, "audio/aac"),
        "m4a" => (FileType::Audio, "audio/x-m4a"),

        _ => (FileType::Unknown, "application/octet-stream"),
    }
}

/// Uploads are stored as `<name>-<timestamp>-<random><ext>`; recover the
/// name the user originally gave the file. Names that don't match the
/// convention pass through untouched.
pub fn strip_upload_suffix(file_name: &str) -> String {
    let (stem, ext) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
        _ => (file_name, ""),
    };

    let mut parts = stem.rsplitn(3, '-');
    if let (Some(random), Some(timestamp), Some(rest)) = (parts.next(), parts.next(), parts.next())
    {
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !rest.is_empty() && all_digits(random) && all_digits(timestamp) {
            return format!("{rest}{ext}");
        }
    }

    file_name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_strip_upload_suffix() {
        assert_eq!(
            strip_upload_suffix("report-1699999999999-123456789.pdf"),
            "report.pdf"
        );
        assert_eq!(
            strip_upload_suffix("my-notes-1699999999999-42.txt"),
            "my-notes.txt"
        );
        // No suffix convention: untouched
        assert_eq!(strip_upload_suffix("report.pdf"), "report.pdf");
        assert_eq!(strip_upload_suffix("a-b-c.png"), "a-b-c.png");
        // No extension
        assert_eq!(strip_upload_suffix("notes-1700000000000-7"), "notes");
    }

    #[test]
    fn test_classify_extension() {
        assert_eq!(classify_extension("JPG"), (FileType::Image, "image/jpeg"));
        assert_eq!(
            classify_extension("pdf"),
            (FileType::Document, "application/pdf")
        );
        assert_eq!(classify_extension("mov"), (FileType::Video, "video/quicktime"));
        assert_eq!(
            classify_extension("xyz"),
            (FileType::Unknown, "application/octet-stream")
        );
        assert_eq!(
            classify_extension(""),
            (FileType::Unknown, "application/octet-stream")
        );
    }

    async fn write_file(dir: &PathBuf, name: &str, len: usize) {
        tokio::fs::write(dir.join(name), vec![0u8; len]).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_skips_junk_and_builds_records() {
        let tmp = TempDir::new().unwrap();
        let service = FileService::new(tmp.path().to_path_buf(), tmp.path().to_path_buf());

        let images = tmp.path().join("images");
        tokio::fs::create_dir_all(&images).await.unwrap();
        write_file(&images, "photo-1700000000000-11.jpg", 2048).await;
        write_file(&images, ".gitkeep", 0).await;
        write_file(&images, "Thumbs.db", 10).await;
        write_file(&images, ".hidden", 5).await;

        let records = service.scan_category(FileCategory::Images).await;
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.file_name, "photo-1700000000000-11.jpg");
        assert_eq!(rec.original_name, "photo.jpg");
        assert_eq!(rec.url, "/uploads/images/photo-1700000000000-11.jpg");
        assert_eq!(rec.file_size, 2048);
        assert_eq!(rec.file_type, FileType::Image);
        assert_eq!(rec.mime_type, "image/jpeg");
        assert_eq!(rec.file_age_in_days, 0);
    }

    #[tokio::test]
    async fn test_scan_missing_directory_self_heals() {
        let tmp = TempDir::new().unwrap();
        let service = FileService::new(tmp.path().to_path_buf(), tmp.path().to_path_buf());

        let records = service.scan_category(FileCategory::CoverImages).await;
        assert!(records.is_empty());
        assert!(tmp.path().join("cover-images").is_dir());
    }

    #[tokio::test]
    async fn test_scan_is_idempotent_for_static_tree() {
        let tmp = TempDir::new().unwrap();
        let service = FileService::new(tmp.path().to_path_buf(), tmp.path().to_path_buf());

        let docs = tmp.path().join("documents");
        tokio::fs::create_dir_all(&docs).await.unwrap();
        write_file(&docs, "a.pdf", 100).await;
        write_file(&docs, "b.txt", 200).await;

        let mut first = service.scan(CategorySelector::All).await;
        let mut second = service.scan(CategorySelector::All).await;
        first.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        second.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        assert_eq!(first.len(), 2);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.file_name, b.file_name);
            assert_eq!(a.file_size, b.file_size);
            assert_eq!(a.created_at, b.created_at);
            assert_eq!(a.url, b.url);
        }
    }
}
