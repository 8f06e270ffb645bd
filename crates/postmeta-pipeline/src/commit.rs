//! Backup → write → verify → (restore) for in-place rewrites

use std::path::Path;

use anyhow::{Context, Result};
use postmeta_core::MetadataTable;
use postmeta_store::{BackupEntry, BackupStore};

use crate::verify::{verify_table, VerifyError};

/// What happened to the target file.
#[derive(Debug)]
pub enum CommitOutcome {
    /// New content written and verified.
    Written { backup: Option<BackupEntry> },
    /// Verification failed; the previous content is back in place
    /// (or the file was removed if there was none).
    RolledBack {
        backup: Option<BackupEntry>,
        errors: Vec<VerifyError>,
    },
}

impl CommitOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Replace `path` with `table`, never without a backup of what was there.
///
/// After writing, the file is read back and checked; on failure the backup
/// is restored before returning [`CommitOutcome::RolledBack`].
pub fn commit_table(
    table: &MetadataTable,
    path: &Path,
    backups: &BackupStore,
    reason: &str,
) -> Result<CommitOutcome> {
    let backup = if path.exists() {
        Some(
            backups
                .create(path, reason)
                .with_context(|| format!("refusing to rewrite {} without a backup", path.display()))?,
        )
    } else {
        None
    };

    table.write(path)?;

    let written = MetadataTable::read(path)?;
    let errors = verify_table(&written, table.records.len());
    if errors.is_empty() {
        log::info!("verified {} ({} rows)", path.display(), written.records.len());
        return Ok(CommitOutcome::Written { backup });
    }

    for e in &errors {
        log::error!("verification failed for {}: {e}", path.display());
    }
    match &backup {
        Some(entry) => backups.restore(entry, path)?,
        None => {
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove unverified {}", path.display()))?;
            log::warn!("removed unverified {}", path.display());
        }
    }
    Ok(CommitOutcome::RolledBack { backup, errors })
}
