//! Merge subcommand - deduplicate by hash ID, optionally merging an export

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use postmeta_core::Category;
use postmeta_pipeline::{CommitOutcome, MergeConfig, MergeOptions};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// External CSV or medium-posts.json to merge into the metadata file
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Category for newly added rows
    #[arg(long)]
    pub category: Option<Category>,

    /// Report without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: MergeArgs, config: &Config) -> Result<()> {
    let merge_config = MergeConfig {
        csv_path: config.paths.csv.clone(),
        source: args.source,
        episodes_path: config.paths.episodes.clone(),
        backup_dir: config.paths.backup_dir.clone(),
        dry_run: args.dry_run,
        options: MergeOptions {
            max_words: config.slug.max_words,
            default_year: config.dates.default_year,
            placeholder_cutoff: config.dates.placeholder_before,
            default_category: args.category,
        },
    };

    let summary = postmeta_pipeline::run_merge(&merge_config)?;
    let report = &summary.report;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Merge").fg(Color::Cyan),
            Cell::new("Rows").fg(Color::Cyan),
        ]);
    table.add_row(vec![Cell::new("working file"), Cell::new(report.working_rows)]);
    if report.malformed_rows > 0 {
        table.add_row(vec![
            Cell::new("malformed (skipped)"),
            Cell::new(report.malformed_rows).fg(Color::Red),
        ]);
    }
    table.add_row(vec![Cell::new("external source"), Cell::new(report.external_rows)]);
    table.add_row(vec![Cell::new("without hash ID"), Cell::new(report.without_hash)]);
    table.add_row(vec![Cell::new("duplicate groups"), Cell::new(report.duplicate_groups)]);
    table.add_row(vec![Cell::new("discarded"), Cell::new(report.discarded)]);
    table.add_row(vec![
        Cell::new("all-placeholder groups"),
        Cell::new(report.all_placeholder.len()).fg(if report.all_placeholder.is_empty() {
            Color::Reset
        } else {
            Color::Yellow
        }),
    ]);
    table.add_row(vec![Cell::new("added"), Cell::new(report.added).fg(Color::Green)]);
    table.add_row(vec![Cell::new("slugs changed"), Cell::new(report.slug_changes)]);
    table.add_row(vec![Cell::new("clusters assigned"), Cell::new(report.clusters_assigned)]);
    table.add_row(vec![Cell::new("result"), Cell::new(summary.rows)]);
    eprintln!("\n{table}");

    match summary.outcome {
        None => eprintln!("Dry run: {} not modified", config.paths.csv.display()),
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
