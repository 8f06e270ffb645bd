//! Slug assignment across a whole table

use postmeta_core::{extract_title_date, is_valid_slug, BlogPostRecord, SlugRegistry};

/// One slug that was created or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugChange {
    pub hash_id: String,
    pub before: String,
    pub after: String,
}

/// Give every record a valid slug that no other record has.
///
/// Valid slugs are reserved first, in table order, so an existing slug is
/// never taken over by a generated one; later duplicates and invalid or
/// blank slugs are regenerated from the title (legacy date prefix removed).
/// With `force`, every slug is regenerated.
pub fn assign_slugs(
    records: &mut [BlogPostRecord],
    registry: &mut SlugRegistry,
    force: bool,
    default_year: i32,
) -> Vec<SlugChange> {
    let mut needs_slug = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let keep = !force && is_valid_slug(&record.slug) && registry.reserve(&record.slug);
        if !keep {
            needs_slug.push(i);
        }
    }

    let mut changes = Vec::new();
    for i in needs_slug {
        let record = &mut records[i];
        let title = extract_title_date(&record.title, default_year).clean_title;
        let slug = registry.generate(&title);
        if slug != record.slug {
            changes.push(SlugChange {
                hash_id: record.hash_id.clone(),
                before: std::mem::replace(&mut record.slug, slug.clone()),
                after: slug,
            });
        }
    }
    changes
}
