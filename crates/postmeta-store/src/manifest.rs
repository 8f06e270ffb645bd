//! Backup manifest: one JSON file listing every backup in the directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Bump when the manifest layout changes incompatibly.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";

/// One backup copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// File name of the copy inside the backup directory (also its ID).
    pub file: String,
    /// Path of the file that was backed up.
    pub source: PathBuf,
    /// Full blake3 hex digest of the copy.
    pub content_hash: String,
    pub bytes: u64,
    /// Which command took the backup.
    pub reason: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Contents of `manifest.json`; entries are kept oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    pub format_version: u32,
    pub entries: Vec<BackupEntry>,
}

impl Default for BackupManifest {
    fn default() -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            entries: Vec::new(),
        }
    }
}

impl BackupManifest {
    /// Read `dir/manifest.json`; a missing manifest is an empty one.
    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if manifest.format_version != CURRENT_FORMAT_VERSION {
            anyhow::bail!(
                "{}: format_version {} != supported {}",
                path.display(),
                manifest.format_version,
                CURRENT_FORMAT_VERSION
            );
        }
        Ok(manifest)
    }

    /// Write `dir/manifest.json` via tmp + rename.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let tmp = dir.join(format!("{MANIFEST_FILE}.tmp"));
        let json = serde_json::to_string_pretty(self).context("failed to serialize manifest")?;
        std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to rename {} → {}", tmp.display(), path.display()))?;
        Ok(())
    }

    pub fn find(&self, file: &str) -> Option<&BackupEntry> {
        self.entries.iter().find(|e| e.file == file)
    }

    /// Newest backup of `source`.
    pub fn latest_for(&self, source: &Path) -> Option<&BackupEntry> {
        self.entries.iter().rev().find(|e| e.source == source)
    }
}
