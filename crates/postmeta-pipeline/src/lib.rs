//! postmeta-pipeline: in-place rewrites of the blog metadata CSV
//!
//! Two batch passes share the same shape: load everything, transform in
//! memory, back up the target, write, read back and verify, restore the
//! backup if verification fails.

pub mod cleanup;
pub mod commit;
pub mod merge;
pub mod slugs;
pub mod sources;
pub mod verify;

pub use cleanup::{cleanup_records, Change, CleanupOptions, CleanupReport};
pub use commit::{commit_table, CommitOutcome};
pub use merge::{merge_records, MergeOptions, MergeReport, MergeResult};
pub use verify::{verify_table, VerifyError};

use std::path::{Path, PathBuf};

use anyhow::Result;
use postmeta_core::{EpisodeTable, MetadataTable};
use postmeta_store::BackupStore;

/// Configuration for a merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Working metadata file (created if missing).
    pub csv_path: PathBuf,
    /// External CSV or `medium-posts.json` to merge in.
    pub source: Option<PathBuf>,
    /// Episode table for filling blank clusters (skipped if absent).
    pub episodes_path: PathBuf,
    pub backup_dir: PathBuf,
    /// Report without writing.
    pub dry_run: bool,
    pub options: MergeOptions,
}

/// Outcome of [`run_merge`].
#[derive(Debug)]
pub struct MergeSummary {
    pub report: MergeReport,
    pub rows: usize,
    /// `None` on dry runs.
    pub outcome: Option<CommitOutcome>,
}

/// Configuration for a cleanup run.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub csv_path: PathBuf,
    pub episodes_path: PathBuf,
    pub backup_dir: PathBuf,
    pub dry_run: bool,
    pub options: CleanupOptions,
}

/// Outcome of [`run_cleanup`].
#[derive(Debug)]
pub struct CleanupSummary {
    pub report: CleanupReport,
    pub rows: usize,
    /// `None` on dry runs or when nothing changed.
    pub outcome: Option<CommitOutcome>,
}

fn load_episodes_if_present(path: &Path) -> Result<Option<EpisodeTable>> {
    if path.exists() {
        Ok(Some(EpisodeTable::load(path)?))
    } else {
        log::warn!("episode table {} not found, clusters left alone", path.display());
        Ok(None)
    }
}

/// Run the merge/dedupe pass.
pub fn run_merge(config: &MergeConfig) -> Result<MergeSummary> {
    let table = MetadataTable::read_or_empty(&config.csv_path)?;
    let header = table.header.clone();

    let external = match &config.source {
        Some(path) => {
            log::info!("Merging {} into {}", path.display(), config.csv_path.display());
            sources::load_records(path)?
        }
        None => {
            log::info!("Deduplicating {}", config.csv_path.display());
            Vec::new()
        }
    };

    let episodes = load_episodes_if_present(&config.episodes_path)?;
    let mut result = merge_records(table.records, external, episodes.as_ref(), &config.options);
    result.report.malformed_rows = table.skipped;
    let rows = result.records.len();

    log::info!(
        "Merge: {} working + {} external rows → {} rows ({} added, {} discarded)",
        result.report.working_rows,
        result.report.external_rows,
        rows,
        result.report.added,
        result.report.discarded
    );

    if config.dry_run {
        log::info!("Dry run, {} not modified", config.csv_path.display());
        return Ok(MergeSummary {
            report: result.report,
            rows,
            outcome: None,
        });
    }

    // Rows that failed to parse were dropped on read; writing would lose them
    if table.skipped > 0 {
        anyhow::bail!(
            "{} has {} malformed rows; fix them before merge rewrites the file",
            config.csv_path.display(),
            table.skipped
        );
    }

    let merged = MetadataTable {
        header,
        records: result.records,
        ..MetadataTable::default()
    };
    let backups = BackupStore::new(&config.backup_dir)?;
    let outcome = commit_table(&merged, &config.csv_path, &backups, "merge")?;

    Ok(MergeSummary {
        report: result.report,
        rows,
        outcome: Some(outcome),
    })
}

/// Run the cleanup pass.
pub fn run_cleanup(config: &CleanupConfig) -> Result<CleanupSummary> {
    let mut table = MetadataTable::read(&config.csv_path)?;
    let episodes = load_episodes_if_present(&config.episodes_path)?.unwrap_or_default();

    log::info!(
        "Cleaning {} rows of {}",
        table.records.len(),
        config.csv_path.display()
    );
    let report = cleanup_records(&mut table.records, &episodes, &config.options);
    let rows = table.records.len();

    if config.dry_run || report.changes.is_empty() {
        if report.changes.is_empty() {
            log::info!("Nothing to change");
        } else {
            log::info!("Dry run, {} not modified", config.csv_path.display());
        }
        return Ok(CleanupSummary {
            report,
            rows,
            outcome: None,
        });
    }

    // Rows that failed to parse were dropped on read; writing would lose them
    if table.skipped > 0 {
        anyhow::bail!(
            "{} has {} malformed rows; fix them before cleanup rewrites the file",
            config.csv_path.display(),
            table.skipped
        );
    }

    let backups = BackupStore::new(&config.backup_dir)?;
    let outcome = commit_table(&table, &config.csv_path, &backups, "cleanup")?;
    Ok(CleanupSummary {
        report,
        rows,
        outcome: Some(outcome),
    })
}
