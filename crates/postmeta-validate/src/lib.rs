//! postmeta-validate: pre-deploy checks of `blog-metadata.csv`
//!
//! Errors block deploy; warnings are reported but do not fail the run.

pub mod report;

pub use postmeta_core::{ImageIndex, IMAGE_EXTENSIONS};
pub use report::{Issue, Severity, ValidationReport};

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use postmeta_core::dates::has_title_date_prefix;
use postmeta_core::{
    find_episode, is_hash_id, is_placeholder_date, is_valid_slug, parse_date, parse_loose,
    BlogPostRecord, EpisodeTable, MetadataTable,
};

/// Fields every row must carry.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "slug",
    "hashId",
    "title",
    "imageSlug",
    "workDate",
    "pubDate",
    "category",
    "cluster",
];

#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub csv_path: PathBuf,
    pub episodes_path: PathBuf,
    pub image_dir: PathBuf,
    pub placeholder_cutoff: NaiveDate,
}

/// Load inputs from disk and validate.
pub fn validate(config: &ValidateConfig) -> Result<ValidationReport> {
    let table = MetadataTable::read(&config.csv_path)?;
    let episodes = EpisodeTable::load(&config.episodes_path)?;
    let images = ImageIndex::load(&config.image_dir)?;
    log::info!(
        "Validating {} rows against {} episodes and {} images",
        table.records.len(),
        episodes.len(),
        images.len()
    );
    Ok(validate_table(&table, &episodes, &images, config.placeholder_cutoff))
}

/// Validate an in-memory table.
pub fn validate_table(
    table: &MetadataTable,
    episodes: &EpisodeTable,
    images: &ImageIndex,
    placeholder_cutoff: NaiveDate,
) -> ValidationReport {
    let mut report = ValidationReport {
        rows: table.records.len(),
        issues: Vec::new(),
    };

    if table.skipped > 0 {
        report.push(
            Severity::Error,
            None,
            "",
            "file",
            format!("{} rows with a wrong field count were not read", table.skipped),
        );
    }
    for (a, b) in episodes.overlaps() {
        report.push(
            Severity::Warning,
            None,
            "",
            "episodes",
            format!("'{a}' and '{b}' overlap; '{a}' wins"),
        );
    }

    let mut slugs: HashMap<&str, usize> = HashMap::new();
    let mut hash_ids: HashMap<&str, usize> = HashMap::new();

    for (i, record) in table.records.iter().enumerate() {
        let row = table.row_number(i);
        let mut check = RowCheck {
            report: &mut report,
            row,
            label: record.label(),
        };

        for field in REQUIRED_FIELDS {
            if record.get(field).unwrap_or("").trim().is_empty() {
                check.error(field, "missing");
            }
        }

        if !record.slug.is_empty() {
            if !is_valid_slug(&record.slug) {
                check.error("slug", format!("'{}' is not a valid slug", record.slug));
            }
            if let Some(first) = slugs.insert(&record.slug, row) {
                check.error("slug", format!("duplicate of row {first}"));
                slugs.insert(&record.slug, first);
            }
        }

        if !record.hash_id.is_empty() {
            if !is_hash_id(&record.hash_id) {
                check.error("hashId", format!("'{}' is not 12 hex characters", record.hash_id));
            }
            if let Some(first) = hash_ids.insert(&record.hash_id, row) {
                check.error("hashId", format!("duplicate of row {first}"));
                hash_ids.insert(&record.hash_id, first);
            }
        }

        let work_date = check_date(&mut check, "workDate", &record.work_date);
        let pub_date = check_date(&mut check, "pubDate", &record.pub_date);

        if !record.chat_date.trim().is_empty() && parse_loose(&record.chat_date).is_none() {
            check.warning("chatDate", format!("'{}' is not a date", record.chat_date));
        }

        if !record.category.is_empty() && record.category().is_none() {
            check.error(
                "category",
                format!("'{}' is not one of building, insight", record.category),
            );
        }

        check_cluster(&mut check, record, episodes);

        if !record.image_slug.trim().is_empty() && images.find(&record.image_slug).is_none() {
            check.error(
                "imageSlug",
                format!("no image for '{}' in {}", record.image_slug, images.dir().display()),
            );
        }

        if pub_date.is_some() && is_placeholder_date(&record.pub_date, placeholder_cutoff) {
            check.warning("pubDate", format!("{} looks like a placeholder", record.pub_date));
        }
        if let (Some(work), Some(publ)) = (work_date, pub_date) {
            if work > publ {
                check.warning("workDate", format!("{work} is after pubDate {publ}"));
            }
        }
        if has_title_date_prefix(&record.title) {
            check.warning("title", "still carries a date prefix; run cleanup");
        }
    }

    report
}

struct RowCheck<'a, 'r> {
    report: &'a mut ValidationReport,
    row: usize,
    label: &'r str,
}

impl RowCheck<'_, '_> {
    fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.report
            .push(Severity::Error, Some(self.row), self.label, field, message);
    }

    fn warning(&mut self, field: &'static str, message: impl Into<String>) {
        self.report
            .push(Severity::Warning, Some(self.row), self.label, field, message);
    }
}

fn check_date(check: &mut RowCheck<'_, '_>, field: &'static str, raw: &str) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    let date = parse_date(raw);
    if date.is_none() {
        check.error(field, format!("'{raw}' is not YYYY-MM-DD"));
    }
    date
}

fn check_cluster(check: &mut RowCheck<'_, '_>, record: &BlogPostRecord, episodes: &EpisodeTable) {
    if record.cluster.is_empty() {
        return;
    }
    if episodes.get(&record.cluster).is_none() {
        check.error("cluster", format!("unknown episode '{}'", record.cluster));
        return;
    }
    let computed = find_episode(&record.work_date, episodes);
    if !computed.is_empty() && computed != record.cluster {
        check.warning(
            "cluster",
            format!("workDate {} falls in '{computed}'", record.work_date),
        );
    }
}
