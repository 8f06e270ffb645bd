//! Feed subcommand - Medium RSS import and image downloads

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use postmeta_core::ProgressContext;
use postmeta_feed::{FeedSource, ImageConfig, ImportConfig};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct FeedArgs {
    #[command(subcommand)]
    pub action: FeedAction,
}

#[derive(Subcommand, Debug)]
pub enum FeedAction {
    /// Merge feed items into medium-posts.json and blog-content.json
    Import {
        /// Feed URL (default: feed.url from config)
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Read the feed from a saved XML file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Report without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Download missing post images from the stored content
    Images,
}

pub fn run(args: FeedArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    match args.action {
        FeedAction::Import { url, file, dry_run } => import(url, file, dry_run, config),
        FeedAction::Images => images(config, progress),
    }
}

fn import(url: Option<String>, file: Option<PathBuf>, dry_run: bool, config: &Config) -> Result<()> {
    let source = match (file, url.or_else(|| config.feed.url.clone())) {
        (Some(path), _) => FeedSource::File(path),
        (None, Some(url)) => FeedSource::Url(url),
        (None, None) => anyhow::bail!("no feed: pass --url or --file, or set feed.url in the config"),
    };

    let import_config = ImportConfig {
        source,
        posts_path: config.paths.medium_posts.clone(),
        content_path: config.paths.blog_content.clone(),
        backup_dir: config.paths.backup_dir.clone(),
        dry_run,
    };
    let summary = postmeta_feed::run_import(&import_config)?;

    println!();
    println!("=== Feed Import ===");
    println!("Added: {}", summary.added);
    println!("Updated: {}", summary.updated);
    println!("New content: {}", summary.contents_added);
    println!("Changed content: {}", summary.contents_updated);
    if summary.skipped > 0 {
        println!("Skipped (no hash ID): {}", summary.skipped);
    }
    Ok(())
}

fn images(config: &Config, progress: &ProgressContext) -> Result<()> {
    let image_config = ImageConfig {
        csv_path: config.paths.csv.clone(),
        content_path: config.paths.blog_content.clone(),
        image_dir: config.paths.image_dir.clone(),
        delay: Duration::from_millis(config.feed.request_delay_ms),
    };
    let summary = postmeta_feed::run_images(&image_config, progress)?;

    println!();
    println!("=== Images ===");
    println!("Downloaded: {}", summary.downloaded);
    println!("Already present: {}", summary.present);
    println!("No source: {}", summary.no_source);
    println!("Failed: {}", summary.failed);
    Ok(())
}
