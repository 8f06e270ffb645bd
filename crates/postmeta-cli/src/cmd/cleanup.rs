//! Cleanup subcommand - normalize titles, dates, slugs and clusters in place

use anyhow::Result;
use clap::Args;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use postmeta_pipeline::{CleanupConfig, CleanupOptions, CommitOutcome};

use crate::config::Config;

/// Changes listed in the table before it is cut off (unless --verbose)
const MAX_LISTED: usize = 50;

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Print changes without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Regenerate every slug from its title
    #[arg(long)]
    pub reslug: bool,

    /// Recompute every cluster, not only blank ones
    #[arg(long)]
    pub reassign: bool,

    /// List every change
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: CleanupArgs, config: &Config) -> Result<()> {
    let cleanup_config = CleanupConfig {
        csv_path: config.paths.csv.clone(),
        episodes_path: config.paths.episodes.clone(),
        backup_dir: config.paths.backup_dir.clone(),
        dry_run: args.dry_run,
        options: CleanupOptions {
            reslug: args.reslug,
            reassign: args.reassign,
            max_words: config.slug.max_words,
            default_year: config.dates.default_year,
        },
    };

    let summary = postmeta_pipeline::run_cleanup(&cleanup_config)?;
    let report = &summary.report;

    if !report.changes.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Post").fg(Color::Cyan),
                Cell::new("Field").fg(Color::Cyan),
                Cell::new("Before").fg(Color::Cyan),
                Cell::new("After").fg(Color::Cyan),
            ]);
        let limit = if args.verbose {
            usize::MAX
        } else {
            MAX_LISTED
        };
        for change in report.changes.iter().take(limit) {
            table.add_row(vec![
                Cell::new(&change.hash_id),
                Cell::new(change.field),
                Cell::new(&change.before).fg(Color::DarkGrey),
                Cell::new(&change.after).fg(Color::Green),
            ]);
        }
        eprintln!("\n{table}");
        if report.changes.len() > limit {
            eprintln!("... {} more (use --verbose)", report.changes.len() - limit);
        }
    }

    eprintln!(
        "{} changes in {} of {} rows; {} unparsed dates; {} rows without an episode",
        report.changes.len(),
        report.records_touched(),
        summary.rows,
        report.unparsed_dates,
        report.unassigned
    );

    match summary.outcome {
        None if args.dry_run => eprintln!("Dry run: {} not modified", config.paths.csv.display()),
        None => {}
        Some(CommitOutcome::Written { backup }) => {
            if let Some(entry) = backup {
                eprintln!("Backup: {}", entry.file);
            }
            eprintln!("Wrote {}", config.paths.csv.display());
        }
        Some(CommitOutcome::RolledBack { errors, .. }) => {
            for e in &errors {
                eprintln!("  {e}");
            }
            anyhow::bail!(
                "verification of {} failed; previous version restored",
                config.paths.csv.display()
            );
        }
    }
    Ok(())
}
