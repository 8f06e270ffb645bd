//! postmeta core - shared primitives for the blog metadata pipeline
//!
//! CSV codec, metadata table, hash IDs, slugs, dates, episodes, the JSON
//! content stores and the image directory index, plus logging/progress
//! plumbing for the binaries.

pub mod csv_row;
pub mod dates;
pub mod episode;
pub mod hash_id;
pub mod images;
pub mod logging;
pub mod posts;
pub mod progress;
pub mod record;
pub mod slug;
pub mod strategy;
pub mod table;

// Re-exports for convenience
pub use csv_row::{format_row, parse_row, split_records};
pub use dates::{
    extract_title_date, is_placeholder_date, parse_date, parse_loose, standardize_date, TitleDate,
};
pub use episode::{find_episode, Episode, EpisodeTable};
pub use hash_id::{extract_hash_id, is_hash_id};
pub use images::{ImageIndex, IMAGE_EXTENSIONS};
pub use logging::{init_logging, ProgressLogger};
pub use posts::{BlogContent, ContentStore, MediumPost};
pub use progress::ProgressContext;
pub use record::{BlogPostRecord, Category, COLUMNS};
pub use slug::{generate_slug, is_valid_slug, SlugRegistry};
pub use strategy::{first_success, Resolved, Strategy};
pub use table::MetadataTable;
