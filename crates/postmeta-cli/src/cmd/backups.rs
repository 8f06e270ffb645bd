//! `postmeta backups` - list, restore and prune backups

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use postmeta_store::{short_hash, BackupEntry, BackupStore};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct BackupsArgs {
    #[command(subcommand)]
    pub action: BackupsAction,
}

#[derive(Subcommand, Debug)]
pub enum BackupsAction {
    /// List backups and verify their hashes
    List,
    /// Copy a backup back over its source (or --to PATH)
    Restore {
        /// Backup file name as shown by `list`
        file: String,

        /// Restore to this path instead of the original location
        #[arg(long)]
        to: Option<PathBuf>,
    },
    /// Remove all but the newest backups of each file
    Prune {
        /// Backups to keep per file (default: backups.keep from config)
        #[arg(long)]
        keep: Option<usize>,

        /// Actually delete (otherwise dry-run)
        #[arg(long)]
        confirm: bool,
    },
}

pub fn run(args: BackupsArgs, config: &Config) -> Result<()> {
    let store = BackupStore::new(&config.paths.backup_dir)?;
    match args.action {
        BackupsAction::List => list(&store),
        BackupsAction::Restore { file, to } => restore(&store, &file, to.as_deref()),
        BackupsAction::Prune { keep, confirm } => {
            prune(&store, keep.unwrap_or(config.backups.keep), confirm)
        }
    }
}

fn entries_table(entries: &[&BackupEntry], store: Option<&BackupStore>) -> Table {
    let mut table = Table::new();
    let mut header = vec![
        Cell::new("File").fg(Color::Cyan),
        Cell::new("Source").fg(Color::Cyan),
        Cell::new("Reason").fg(Color::Cyan),
        Cell::new("Created").fg(Color::Cyan),
        Cell::new("Bytes").fg(Color::Cyan),
        Cell::new("Hash").fg(Color::Cyan),
    ];
    if store.is_some() {
        header.push(Cell::new("OK").fg(Color::Cyan));
    }
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);

    for entry in entries {
        let mut row = vec![
            Cell::new(&entry.file),
            Cell::new(entry.source.display()),
            Cell::new(&entry.reason),
            Cell::new(entry.created_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(entry.bytes),
            Cell::new(short_hash(&entry.content_hash)),
        ];
        if let Some(store) = store {
            row.push(if store.verify(entry).ok {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("NO").fg(Color::Red)
            });
        }
        table.add_row(row);
    }
    table
}

fn list(store: &BackupStore) -> Result<()> {
    let entries = store.list()?;

    if entries.is_empty() {
        eprintln!("No backups in {}.", store.dir().display());
    } else {
        let refs: Vec<&BackupEntry> = entries.iter().collect();
        eprintln!("\n{}", entries_table(&refs, Some(store)));
        eprintln!("{} backups total", entries.len());
    }

    let orphans = store.orphans()?;
    if !orphans.is_empty() {
        eprintln!("{} files not in the manifest:", orphans.len());
        for path in &orphans {
            eprintln!("  {}", path.display());
        }
    }
    Ok(())
}

fn restore(store: &BackupStore, file: &str, to: Option<&Path>) -> Result<()> {
    let Some(entry) = store.find(file)? else {
        anyhow::bail!("no backup named '{file}' (see `postmeta backups list`)");
    };
    let target = to.unwrap_or(entry.source.as_path());

    // The file being replaced gets a backup of its own
    if target.exists() {
        let current = store.create(target, "pre-restore")?;
        eprintln!("Current {} saved as {}", target.display(), current.file);
    }
    store.restore(&entry, target)?;
    eprintln!("Restored {} from {}", target.display(), entry.file);
    Ok(())
}

fn prune(store: &BackupStore, keep: usize, confirm: bool) -> Result<()> {
    if confirm {
        let removed = store.prune(keep)?;
        eprintln!("Removed {} backups (kept {keep} per file)", removed.len());
        return Ok(());
    }

    let plan = store.prune_plan(keep)?;
    let doomed: Vec<&BackupEntry> = plan.iter().collect();

    if doomed.is_empty() {
        eprintln!("Nothing to prune (keeping {keep} per file).");
    } else {
        eprintln!("\n{}", entries_table(&doomed, None));
        eprintln!(
            "{} backups would be removed. Use --confirm to delete.",
            doomed.len()
        );
    }
    Ok(())
}
