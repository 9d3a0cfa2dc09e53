use std::cmp::Ordering;

use super::types::{FileFilter, FileRecord, Pagination, SortBy, SortOrder};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Apply every requested filter. Free-text search matches the original
/// name, category, type and mime type, case-insensitively.
pub fn filter_records(records: Vec<FileRecord>, filter: &FileFilter) -> Vec<FileRecord> {
    let search = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    records
        .into_iter()
        .filter(|rec| {
            if let Some(ref needle) = search {
                let matches = rec.original_name.to_lowercase().contains(needle)
                    || rec.category.as_str().contains(needle)
                    || rec.file_type.as_str().contains(needle)
                    || rec.mime_type.to_lowercase().contains(needle);
                if !matches {
                    return false;
                }
            }

            if let Some(file_type) = filter.file_type {
                if rec.file_type != file_type {
                    return false;
                }
            }

            if let Some(from) = filter.date_from {
                if rec.created_at < from {
                    return false;
                }
            }
            if let Some(to) = filter.date_to {
                if rec.created_at > to {
                    return false;
                }
            }

            if let Some(min) = filter.size_min_mb {
                if (rec.file_size as f64) < min * BYTES_PER_MB {
                    return false;
                }
            }
            if let Some(max) = filter.size_max_mb {
                if (rec.file_size as f64) > max * BYTES_PER_MB {
                    return false;
                }
            }

            if let Some(min) = filter.age_min_days {
                if rec.file_age_in_days < min {
                    return false;
                }
            }
            if let Some(max) = filter.age_max_days {
                if rec.file_age_in_days > max {
                    return false;
                }
            }

            true
        })
        .collect()
}

/// Sort in place. String keys compare case-insensitively; numeric and time
/// keys by difference. Default direction is descending.
pub fn sort_records(records: &mut [FileRecord], sort_by: SortBy, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Name => compare_names(&a.original_name, &b.original_name),
            SortBy::Size => a.file_size.cmp(&b.file_size),
            SortBy::Category => compare_names(a.category.as_str(), b.category.as_str()),
            SortBy::Type => compare_names(a.file_type.as_str(), b.file_type.as_str()),
            SortBy::Age => a.file_age_in_days.cmp(&b.file_age_in_days),
            SortBy::ModifiedAt => a.modified_at.cmp(&b.modified_at),
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Slice out one page and describe the whole set.
pub fn paginate(records: Vec<FileRecord>, page: u64, limit: u64) -> (Vec<FileRecord>, Pagination) {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = records.len() as u64;
    let total_pages = total.div_ceil(limit).max(1);

    let start = ((page - 1) * limit) as usize;
    let page_records = records
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    (
        page_records,
        Pagination {
            page,
            limit,
            total,
            total_pages,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::file_service::types::{FileCategory, FileType};
    use chrono::{Duration, Utc};

    fn record(name: &str, category: FileCategory, file_type: FileType, size: u64, age: i64) -> FileRecord {
        let created = Utc::now() - Duration::days(age);
        FileRecord {
            file_name: name.to_string(),
            original_name: name.to_string(),
            url: format!("/uploads/{}/{}", category.as_str(), name),
            file_size: size,
            file_type,
            mime_type: "application/octet-stream".to_string(),
            category,
            created_at: created,
            modified_at: created,
            file_age_in_days: age,
        }
    }

    fn sample_set() -> Vec<FileRecord> {
        vec![
            record("alpha.jpg", FileCategory::Images, FileType::Image, 500_000, 2),
            record("Beta.jpg", FileCategory::Images, FileType::Image, 3_000_000, 10),
            record("gamma.png", FileCategory::Images, FileType::Image, 1_500_000, 40),
            record("notes.pdf", FileCategory::Documents, FileType::Document, 250_000, 5),
            record("deck.pptx", FileCategory::Documents, FileType::Document, 9_000_000, 400),
        ]
    }

    #[test]
    fn test_filter_by_type_only_keeps_matches() {
        let filter = FileFilter {
            file_type: Some(FileType::Image),
            ..Default::default()
        };
        let out = filter_records(sample_set(), &filter);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.file_type == FileType::Image));
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let filter = FileFilter {
            search: Some("BETA".to_string()),
            ..Default::default()
        };
        let out = filter_records(sample_set(), &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].original_name, "Beta.jpg");
    }

    #[test]
    fn test_filter_size_range_in_mb() {
        let filter = FileFilter {
            size_min_mb: Some(1.0),
            size_max_mb: Some(5.0),
            ..Default::default()
        };
        let out = filter_records(sample_set(), &filter);
        let names: Vec<_> = out.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Beta.jpg"));
        assert!(names.contains(&"gamma.png"));
    }

    #[test]
    fn test_filter_age_range() {
        let filter = FileFilter {
            age_min_days: Some(5),
            age_max_days: Some(50),
            ..Default::default()
        };
        let out = filter_records(sample_set(), &filter);
        assert_eq!(out.len(), 3); // ages 10, 40, 5
    }

    #[test]
    fn test_sort_name_asc_ignores_case() {
        let mut records = sample_set();
        sort_records(&mut records, SortBy::Name, SortOrder::Asc);
        let names: Vec<_> = records.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, vec!["alpha.jpg", "Beta.jpg", "deck.pptx", "gamma.png", "notes.pdf"]);
    }

    #[test]
    fn test_sort_created_desc_is_default_direction() {
        let mut records = sample_set();
        sort_records(&mut records, SortBy::CreatedAt, SortOrder::Desc);
        assert_eq!(records[0].original_name, "alpha.jpg"); // youngest first
        assert_eq!(records[4].original_name, "deck.pptx");
    }

    #[test]
    fn test_sort_size() {
        let mut records = sample_set();
        sort_records(&mut records, SortBy::Size, SortOrder::Desc);
        assert_eq!(records[0].original_name, "deck.pptx");
        assert_eq!(records[4].original_name, "notes.pdf");
    }

    #[test]
    fn test_paginate_bounds() {
        let (page, info) = paginate(sample_set(), 2, 2);
        assert_eq!(page.len(), 2);
        assert_eq!(info.total, 5);
        assert_eq!(info.total_pages, 3);

        let (page, info) = paginate(sample_set(), 9, 2);
        assert!(page.is_empty());
        assert_eq!(info.page, 9);

        // Page/limit are clamped to at least 1
        let (page, info) = paginate(sample_set(), 0, 0);
        assert_eq!(info.page, 1);
        assert_eq!(info.limit, 1);
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_category_filter_scenario() {
        // 3 images + 2 documents: category filter happens at scan scope,
        // so here the equivalent is type filtering plus pagination.
        let filter = FileFilter {
            file_type: Some(FileType::Image),
            ..Default::default()
        };
        let filtered = filter_records(sample_set(), &filter);
        let (page, info) = paginate(filtered, 1, 10);
        assert_eq!(page.len(), 3);
        assert_eq!(info.total_pages, 1);
    }
}
