//! postmeta - maintenance CLI for the blog metadata dataset
//!
//! Merges, cleans and validates `blog-metadata.csv`, imports the Medium
//! feed into the JSON stores, and manages the backups taken on the way.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "postmeta")]
#[command(about = "Blog metadata reconciliation toolkit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./postmeta.toml or ~/.config/postmeta/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Deduplicate the metadata file and merge in an export
    Merge(cmd::merge::MergeArgs),
    /// Normalize titles, dates, slugs and clusters
    Cleanup(cmd::cleanup::CleanupArgs),
    /// Check the metadata file before deploy
    Validate(cmd::validate::ValidateArgs),
    /// Show the episode table and post counts per episode
    Episodes,
    /// Import the Medium feed and download post images
    Feed(cmd::feed::FeedArgs),
    /// Resolve the newsletter subscriber count
    Subscribers,
    /// List, restore and prune backups
    Backups(cmd::backups::BackupsArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = postmeta_core::ProgressContext::new();

    // Logging: info by default so batch runs report what they did;
    // in a TTY log lines go through the progress bars
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    postmeta_core::init_logging(false, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Merge(args) => cmd::merge::run(args, &config),
        Command::Cleanup(args) => cmd::cleanup::run(args, &config),
        Command::Validate(args) => cmd::validate::run(args, &config),
        Command::Episodes => cmd::episodes::run(&config),
        Command::Feed(args) => cmd::feed::run(args, &config, &progress),
        Command::Subscribers => cmd::subscribers::run(&config),
        Command::Backups(args) => cmd::backups::run(args, &config),
        Command::Config => {
            use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            let paths = &config.paths;
            table.add_row(vec!["Metadata CSV", &paths.csv.display().to_string()]);
            table.add_row(vec!["Medium posts", &paths.medium_posts.display().to_string()]);
            table.add_row(vec!["Blog content", &paths.blog_content.display().to_string()]);
            table.add_row(vec!["Episodes", &paths.episodes.display().to_string()]);
            table.add_row(vec!["Images", &paths.image_dir.display().to_string()]);
            table.add_row(vec!["Backups", &paths.backup_dir.display().to_string()]);
            table.add_row(vec!["Slug max words", &config.slug.max_words.to_string()]);
            table.add_row(vec!["Default year", &config.dates.default_year.to_string()]);
            table.add_row(vec![
                "Placeholder before",
                &config.dates.placeholder_before.to_string(),
            ]);
            table.add_row(vec!["Backups kept", &config.backups.keep.to_string()]);
            table.add_row(vec![
                "Feed URL",
                config.feed.url.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec![
                "Request delay",
                &format!("{}ms", config.feed.request_delay_ms),
            ]);
            table.add_row(vec![
                "Subscriber page",
                config.subscribers.page_url.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec![
                "Session cookie",
                if config.subscribers.session_cookie.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
