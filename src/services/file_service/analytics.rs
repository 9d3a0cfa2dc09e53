use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use super::types::{FileRecord, FileType};

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_files: u64,
    pub total_size: u64,
    pub average_size: u64,
    pub distinct_types: u64,
    pub distinct_mime_types: u64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    pub count: u64,
    pub size: u64,
    /// Per-type breakdown within the category
    pub types: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeBucket {
    pub count: u64,
    pub size: u64,
    /// Per-category breakdown within the type
    pub categories: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SizeDistribution {
    pub tiny: u64,   // < 100 KB
    pub small: u64,  // < 1 MB
    pub medium: u64, // < 10 MB
    pub large: u64,  // < 100 MB
    pub huge: u64,   // >= 100 MB
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgeDistribution {
    pub today: u64,        // <= 1 day
    pub this_week: u64,    // <= 7 days
    pub this_month: u64,   // <= 30 days
    pub this_quarter: u64, // <= 90 days
    pub this_year: u64,    // <= 365 days
    pub older: u64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadTrends {
    pub daily: BTreeMap<String, u64>,
    pub weekly: BTreeMap<String, u64>,
    pub monthly: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKind {
    Exact,
    Potential,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub original_name: String,
    pub kind: DuplicateKind,
    /// Set for exact groups, where all members share one size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    pub files: Vec<String>,
    pub count: u64,
    /// Bytes reclaimable by keeping a single copy
    pub savings: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageEfficiency {
    /// Images above 1 MB, the usual compression candidates
    pub large_images: u64,
    pub duplicates: Vec<DuplicateGroup>,
    pub potential_savings: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalytics {
    pub overview: OverviewStats,
    pub by_category: BTreeMap<String, CategoryBucket>,
    pub by_type: BTreeMap<String, TypeBucket>,
    pub size_distribution: SizeDistribution,
    pub age_distribution: AgeDistribution,
    pub trends: UploadTrends,
    pub storage: StorageEfficiency,
    pub recommendations: Vec<String>,
}

pub fn overview(records: &[FileRecord]) -> OverviewStats {
    let total_files = records.len() as u64;
    let total_size: u64 = records.iter().map(|r| r.file_size).sum();
    let distinct_types: HashSet<&str> = records.iter().map(|r| r.file_type.as_str()).collect();
    let distinct_mimes: HashSet<&str> = records.iter().map(|r| r.mime_type.as_str()).collect();

    OverviewStats {
        total_files,
        total_size,
        average_size: if total_files > 0 {
            total_size / total_files
        } else {
            0
        },
        distinct_types: distinct_types.len() as u64,
        distinct_mime_types: distinct_mimes.len() as u64,
    }
}

pub fn by_category(records: &[FileRecord]) -> BTreeMap<String, CategoryBucket> {
    let mut buckets: BTreeMap<String, CategoryBucket> = BTreeMap::new();
    for rec in records {
        let bucket = buckets.entry(rec.category.as_str().to_string()).or_default();
        bucket.count += 1;
        bucket.size += rec.file_size;
        *bucket
            .types
            .entry(rec.file_type.as_str().to_string())
            .or_default() += 1;
    }
    buckets
}

pub fn by_type(records: &[FileRecord]) -> BTreeMap<String, TypeBucket> {
    let mut buckets: BTreeMap<String, TypeBucket> = BTreeMap::new();
    for rec in records {
        let bucket = buckets.entry(rec.file_type.as_str().to_string()).or_default();
        bucket.count += 1;
        bucket.size += rec.file_size;
        *bucket
            .categories
            .entry(rec.category.as_str().to_string())
            .or_default() += 1;
    }
    buckets
}

pub fn size_distribution(records: &[FileRecord]) -> SizeDistribution {
    let mut dist = SizeDistribution::default();
    for rec in records {
        match rec.file_size {
            s if s < 100 * KB => dist.tiny += 1,
            s if s < MB => dist.small += 1,
            s if s < 10 * MB => dist.medium += 1,
            s if s < 100 * MB => dist.large += 1,
            _ => dist.huge += 1,
        }
    }
    dist
}

pub fn age_distribution(records: &[FileRecord]) -> AgeDistribution {
    let mut dist = AgeDistribution::default();
    for rec in records {
        match rec.file_age_in_days {
            d if d <= 1 => dist.today += 1,
            d if d <= 7 => dist.this_week += 1,
            d if d <= 30 => dist.this_month += 1,
            d if d <= 90 => dist.this_quarter += 1,
            d if d <= 365 => dist.this_year += 1,
            _ => dist.older += 1,
        }
    }
    dist
}

pub fn trends(records: &[FileRecord]) -> UploadTrends {
    let mut out = UploadTrends::default();
    for rec in records {
        *out.daily
            .entry(rec.created_at.format("%Y-%m-%d").to_string())
            .or_default() += 1;
        *out.weekly
            .entry(rec.created_at.format("%G-W%V").to_string())
            .or_default() += 1;
        *out.monthly
            .entry(rec.created_at.format("%Y-%m").to_string())
            .or_default() += 1;
    }
    out
}

/// Duplicate detection keyed on (originalName, fileSize). Identical pairs
/// are exact duplicates; same name with differing sizes is only a potential
/// duplicate and reported separately.
pub fn find_duplicates(records: &[FileRecord]) -> Vec<DuplicateGroup> {
    let mut by_name: BTreeMap<&str, Vec<&FileRecord>> = BTreeMap::new();
    for rec in records {
        by_name.entry(rec.original_name.as_str()).or_default().push(rec);
    }

    let mut groups = Vec::new();
    for (name, members) in by_name {
        if members.len() < 2 {
            continue;
        }

        let mut by_size: BTreeMap<u64, Vec<&FileRecord>> = BTreeMap::new();
        for rec in &members {
            by_size.entry(rec.file_size).or_default().push(rec);
        }

        for (size, same_size) in &by_size {
            if same_size.len() > 1 {
                groups.push(DuplicateGroup {
                    original_name: name.to_string(),
                    kind: DuplicateKind::Exact,
                    file_size: Some(*size),
                    files: same_size.iter().map(|r| r.url.clone()).collect(),
                    count: same_size.len() as u64,
                    savings: size * (same_size.len() as u64 - 1),
                });
            }
        }

        if by_size.len() > 1 {
            let total: u64 = members.iter().map(|r| r.file_size).sum();
            let smallest = *by_size.keys().next().unwrap_or(&0);
            groups.push(DuplicateGroup {
                original_name: name.to_string(),
                kind: DuplicateKind::Potential,
                file_size: None,
                files: members.iter().map(|r| r.url.clone()).collect(),
                count: members.len() as u64,
                savings: total - smallest,
            });
        }
    }

    groups
}

pub fn storage_efficiency(records: &[FileRecord]) -> StorageEfficiency {
    let large_images = records
        .iter()
        .filter(|r| r.file_type == FileType::Image && r.file_size > MB)
        .count() as u64;

    let duplicates = find_duplicates(records);
    let potential_savings = duplicates.iter().map(|g| g.savings).sum();

    StorageEfficiency {
        large_images,
        duplicates,
        potential_savings,
    }
}

pub fn analyze(records: &[FileRecord]) -> FileAnalytics {
    let overview = overview(records);
    let storage = storage_efficiency(records);
    let recommendations = recommendations(records, &overview, &storage);

    FileAnalytics {
        by_category: by_category(records),
        by_type: by_type(records),
        size_distribution: size_distribution(records),
        age_distribution: age_distribution(records),
        trends: trends(records),
        overview,
        storage,
        recommendations,
    }
}

/// Advisory strings only; nothing here is enforced.
pub fn recommendations(
    records: &[FileRecord],
    overview: &OverviewStats,
    storage: &StorageEfficiency,
) -> Vec<String> {
    let mut out = Vec::new();
    let total = overview.total_files;

    if overview.total_size > 100 * GB {
        out.push(
            "Total upload storage exceeds 100 GB; consider archiving rarely accessed files."
                .to_string(),
        );
    }

    if total > 0 && storage.large_images * 10 > total {
        out.push(format!(
            "{} images are larger than 1 MB; recompressing them would reduce storage and page weight.",
            storage.large_images
        ));
    }

    let old_files = records.iter().filter(|r| r.file_age_in_days > 365).count() as u64;
    if total > 0 && old_files * 10 > total * 3 {
        out.push(format!(
            "{} files are older than a year; run a cleanup to reclaim space.",
            old_files
        ));
    }

    if !storage.duplicates.is_empty() {
        out.push(format!(
            "Found {} duplicate groups; removing extra copies would free {} bytes.",
            storage.duplicates.len(),
            storage.potential_savings
        ));
    }

    out
}
