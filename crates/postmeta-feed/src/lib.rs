//! postmeta-feed: Medium RSS import, image downloads, subscriber count

pub mod http;
pub mod images;
pub mod import;
pub mod rss;
pub mod subscribers;

pub use http::{fetch, fetch_text, FetchError};
pub use images::{download_images, first_image_src, image_extension, ImageSummary};
pub use import::{import_feed, ImportSummary};
pub use rss::{parse_feed, FeedItem};
pub use subscribers::{resolve_subscriber_count, CachedCount, SubscriberConfig};

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use postmeta_core::posts::{load_posts, save_posts};
use postmeta_core::{ContentStore, MetadataTable, ProgressContext};
use postmeta_store::BackupStore;

/// Where the feed XML comes from.
#[derive(Debug, Clone)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub source: FeedSource,
    pub posts_path: PathBuf,
    pub content_path: PathBuf,
    pub backup_dir: PathBuf,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub csv_path: PathBuf,
    pub content_path: PathBuf,
    pub image_dir: PathBuf,
    pub delay: Duration,
}

/// Fetch or read the feed and merge it into the JSON stores.
pub fn run_import(config: &ImportConfig) -> Result<ImportSummary> {
    let xml = match &config.source {
        FeedSource::Url(url) => {
            log::info!("Fetching {url}");
            fetch_text(url).with_context(|| format!("failed to fetch feed {url}"))?
        }
        FeedSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
    };
    let items = parse_feed(&xml)?;
    log::info!("{} items in feed", items.len());

    let mut posts = load_posts(&config.posts_path)?;
    let mut contents = ContentStore::load(&config.content_path)?;
    let summary = import_feed(&items, &mut posts, &mut contents);

    if config.dry_run {
        log::info!("Dry run, stores not modified");
        return Ok(summary);
    }
    if !summary.has_changes() {
        log::info!("Stores already up to date");
        return Ok(summary);
    }

    let backups = BackupStore::new(&config.backup_dir)?;
    backup_if_present(&backups, &config.posts_path)?;
    backup_if_present(&backups, &config.content_path)?;
    save_posts(&config.posts_path, &posts)?;
    contents.save(&config.content_path)?;
    log::info!(
        "{} posts, {} contents written",
        posts.len(),
        contents.len()
    );
    Ok(summary)
}

fn backup_if_present(backups: &BackupStore, path: &Path) -> Result<()> {
    if path.exists() {
        backups.create(path, "feed-import")?;
    }
    Ok(())
}

/// Download images missing for rows of the metadata file.
pub fn run_images(config: &ImageConfig, progress: &ProgressContext) -> Result<ImageSummary> {
    let table = MetadataTable::read(&config.csv_path)?;
    let contents = ContentStore::load(&config.content_path)?;

    let pb = progress.count_bar("images", table.records.len() as u64);
    let summary = download_images(
        &table.records,
        &contents,
        &config.image_dir,
        config.delay,
        &pb,
    )?;
    pb.finish_and_clear();

    log::info!(
        "Images: {} downloaded, {} present, {} without source, {} failed",
        summary.downloaded,
        summary.present,
        summary.no_source,
        summary.failed
    );
    Ok(summary)
}
