//! Loading merge inputs: metadata CSVs and `medium-posts.json` exports

use std::path::Path;

use anyhow::Result;
use postmeta_core::posts::load_posts;
use postmeta_core::{BlogPostRecord, MetadataTable};

/// Read records from a CSV or a `.json` Medium export (chosen by extension).
pub fn load_records(path: &Path) -> Result<Vec<BlogPostRecord>> {
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let posts = load_posts(path)?;
        let total = posts.len();
        let records: Vec<BlogPostRecord> = posts.iter().filter_map(|p| p.to_record()).collect();
        if records.len() < total {
            log::warn!(
                "{}: {} posts without a hash ID skipped",
                path.display(),
                total - records.len()
            );
        }
        Ok(records)
    } else {
        Ok(MetadataTable::read(path)?.records)
    }
}
