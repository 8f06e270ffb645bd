//! Merge and deduplicate metadata rows by hash ID
//!
//! Candidates are taken in order (working file first, then the external
//! source). For each hash ID the first candidate with a real publication
//! date wins over candidates carrying a placeholder date; when every
//! candidate is a placeholder the first one is kept and a warning logged.

use std::collections::HashMap;

use chrono::NaiveDate;
use postmeta_core::{
    extract_hash_id, find_episode, is_hash_id, is_placeholder_date, BlogPostRecord, Category,
    EpisodeTable, SlugRegistry,
};

use crate::slugs::assign_slugs;

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub max_words: usize,
    pub default_year: i32,
    /// Publication dates before this count as placeholders.
    pub placeholder_cutoff: NaiveDate,
    /// Category given to newly added rows that have none.
    pub default_category: Option<Category>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            max_words: postmeta_core::slug::DEFAULT_MAX_WORDS,
            default_year: postmeta_core::dates::DEFAULT_YEAR,
            placeholder_cutoff: postmeta_core::dates::default_placeholder_cutoff(),
            default_category: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MergeReport {
    pub working_rows: usize,
    /// Working-file rows skipped on read for a wrong field count.
    pub malformed_rows: usize,
    pub external_rows: usize,
    /// Rows dropped because no hash ID could be found.
    pub without_hash: usize,
    /// Hash IDs that had more than one candidate.
    pub duplicate_groups: usize,
    /// Candidate rows discarded in favour of another.
    pub discarded: usize,
    /// Duplicate groups where no candidate had a real date.
    pub all_placeholder: Vec<String>,
    /// Rows whose hash ID was not in the working file.
    pub added: usize,
    pub slug_changes: usize,
    pub clusters_assigned: usize,
}

#[derive(Debug)]
pub struct MergeResult {
    pub records: Vec<BlogPostRecord>,
    pub report: MergeReport,
}

struct Candidate {
    record: BlogPostRecord,
    from_working: bool,
}

/// Merge `working` and `external` rows into one deduplicated list.
///
/// Output order is first appearance of each hash ID. Slugs are made unique
/// across the result; with `episodes`, blank clusters are filled in.
pub fn merge_records(
    working: Vec<BlogPostRecord>,
    external: Vec<BlogPostRecord>,
    episodes: Option<&EpisodeTable>,
    opts: &MergeOptions,
) -> MergeResult {
    let mut report = MergeReport {
        working_rows: working.len(),
        external_rows: external.len(),
        ..Default::default()
    };

    let mut groups: Vec<(String, Vec<Candidate>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let tagged = working
        .into_iter()
        .map(|r| (r, true))
        .chain(external.into_iter().map(|r| (r, false)));
    for (mut record, from_working) in tagged {
        let Some(hash_id) = normalize_hash_id(&record.hash_id) else {
            log::warn!("{}: no hash ID in '{}', dropping row", record.label(), record.hash_id);
            report.without_hash += 1;
            continue;
        };
        record.hash_id = hash_id.clone();

        let candidate = Candidate {
            record,
            from_working,
        };
        match index.get(&hash_id) {
            Some(&i) => groups[i].1.push(candidate),
            None => {
                index.insert(hash_id.clone(), groups.len());
                groups.push((hash_id, vec![candidate]));
            }
        }
    }

    let mut records = Vec::with_capacity(groups.len());
    let mut added = Vec::new();
    for (hash_id, mut candidates) in groups {
        let is_new = !candidates.iter().any(|c| c.from_working);
        if candidates.len() > 1 {
            report.duplicate_groups += 1;
            report.discarded += candidates.len() - 1;
        }

        let pick = match candidates
            .iter()
            .position(|c| !is_placeholder_date(&c.record.pub_date, opts.placeholder_cutoff))
        {
            Some(i) => i,
            None => {
                if candidates.len() > 1 {
                    log::warn!(
                        "{hash_id}: {} candidates, none with a real pubDate; keeping the first",
                        candidates.len()
                    );
                    report.all_placeholder.push(hash_id.clone());
                }
                0
            }
        };
        let chosen = candidates.swap_remove(pick).record;
        if !candidates.is_empty() {
            log::debug!("{hash_id}: kept '{}', discarded {}", chosen.label(), candidates.len());
        }

        if is_new {
            added.push(records.len());
        }
        records.push(chosen);
    }
    report.added = added.len();

    for &i in &added {
        let record = &mut records[i];
        if record.category.trim().is_empty() {
            if let Some(category) = opts.default_category {
                record.category = category.to_string();
            }
        }
    }

    let mut registry = SlugRegistry::new(opts.max_words);
    report.slug_changes = assign_slugs(&mut records, &mut registry, false, opts.default_year).len();

    for &i in &added {
        let record = &mut records[i];
        if record.image_slug.trim().is_empty() {
            record.image_slug = record.slug.clone();
        }
    }

    if let Some(episodes) = episodes {
        for record in records.iter_mut().filter(|r| r.cluster.trim().is_empty()) {
            let episode = find_episode(&record.work_date, episodes);
            if !episode.is_empty() {
                record.cluster = episode.to_string();
                report.clusters_assigned += 1;
            }
        }
    }

    MergeResult { records, report }
}

/// Hash ID as stored, or extracted from a URL/GUID left in the column.
fn normalize_hash_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if is_hash_id(raw) {
        Some(raw.to_string())
    } else {
        extract_hash_id(raw)
    }
}
