//! Normalization pass over the metadata table
//!
//! Per record: legacy title prefix → `chatDate`, dates to ISO, blank
//! `workDate` from `chatDate`, category lowercased, blank `imageSlug` from
//! the slug, episode cluster assignment. Slugs are repaired table-wide.

use postmeta_core::{
    extract_title_date, find_episode, parse_date, standardize_date, BlogPostRecord, EpisodeTable,
    SlugRegistry,
};

use crate::slugs::assign_slugs;

/// Knobs for [`cleanup_records`].
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Regenerate every slug from its title.
    pub reslug: bool,
    /// Recompute `cluster` for every record, not only blank ones.
    pub reassign: bool,
    pub max_words: usize,
    /// Year for title prefixes that omit it.
    pub default_year: i32,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            reslug: false,
            reassign: false,
            max_words: postmeta_core::slug::DEFAULT_MAX_WORDS,
            default_year: postmeta_core::dates::DEFAULT_YEAR,
        }
    }
}

/// One field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub hash_id: String,
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub changes: Vec<Change>,
    /// Date fields left as-is because they could not be parsed.
    pub unparsed_dates: usize,
    /// Records with no episode covering their work date.
    pub unassigned: usize,
}

impl CleanupReport {
    pub fn records_touched(&self) -> usize {
        let mut ids: Vec<&str> = self.changes.iter().map(|c| c.hash_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

fn set_field(
    report: &mut CleanupReport,
    hash_id: &str,
    field: &'static str,
    slot: &mut String,
    value: String,
) {
    if *slot != value {
        report.changes.push(Change {
            hash_id: hash_id.to_string(),
            field,
            before: std::mem::replace(slot, value.clone()),
            after: value,
        });
    }
}

/// Run the cleanup pass in place and report what changed.
pub fn cleanup_records(
    records: &mut [BlogPostRecord],
    episodes: &EpisodeTable,
    opts: &CleanupOptions,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    for record in records.iter_mut() {
        let id = record.hash_id.clone();

        let td = extract_title_date(&record.title, opts.default_year);
        if let Some(chat_date) = td.chat_date {
            set_field(&mut report, &id, "title", &mut record.title, td.clean_title);
            if record.chat_date.trim().is_empty() {
                set_field(&mut report, &id, "chatDate", &mut record.chat_date, chat_date);
            }
        }

        for (field, slot) in [
            ("workDate", &mut record.work_date),
            ("pubDate", &mut record.pub_date),
        ] {
            let normalized = standardize_date(slot);
            if !normalized.trim().is_empty() && parse_date(&normalized).is_none() {
                report.unparsed_dates += 1;
            }
            set_field(&mut report, &id, field, slot, normalized);
        }

        if record.work_date.trim().is_empty() && !record.chat_date.trim().is_empty() {
            let from_chat = standardize_date(&record.chat_date);
            if parse_date(&from_chat).is_some() {
                set_field(&mut report, &id, "workDate", &mut record.work_date, from_chat);
            }
        }

        let category = record.category.trim().to_lowercase();
        set_field(&mut report, &id, "category", &mut record.category, category);

        if opts.reassign || record.cluster.trim().is_empty() {
            let episode = find_episode(&record.work_date, episodes);
            if episode.is_empty() {
                report.unassigned += 1;
                log::warn!(
                    "{}: no episode covers workDate '{}'",
                    record.label(),
                    record.work_date
                );
            }
            if !episode.is_empty() || opts.reassign {
                set_field(&mut report, &id, "cluster", &mut record.cluster, episode.to_string());
            }
        }
    }

    let mut registry = SlugRegistry::new(opts.max_words);
    for change in assign_slugs(records, &mut registry, opts.reslug, opts.default_year) {
        report.changes.push(Change {
            hash_id: change.hash_id,
            field: "slug",
            before: change.before,
            after: change.after,
        });
    }

    for record in records.iter_mut() {
        if record.image_slug.trim().is_empty() && !record.slug.is_empty() {
            let id = record.hash_id.clone();
            let slug = record.slug.clone();
            set_field(&mut report, &id, "imageSlug", &mut record.image_slug, slug);
        }
    }

    report
}
