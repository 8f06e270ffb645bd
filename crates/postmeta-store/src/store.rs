//! Backup directory
//!
//! Layout:
//! ```text
//! {dir}/
//! ├── manifest.json
//! ├── blog-metadata.20251005-101500.csv
//! ├── blog-metadata.20251005-101500-2.csv   # second backup in the same second
//! └── medium-posts.20251006-090000.json
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::hash;
use crate::manifest::{BackupEntry, BackupManifest, MANIFEST_FILE};

/// Result of re-hashing a backup copy.
#[derive(Debug)]
pub struct VerifyResult {
    pub file: String,
    pub expected: String,
    pub actual: String,
    pub ok: bool,
}

/// Directory of verified backups.
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    /// Open (creating if needed) a backup directory.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create backup dir: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the store and record it in the manifest.
    pub fn create(&self, source: &Path, reason: &str) -> Result<BackupEntry> {
        let source_key = source_key(source);
        let file = self.unique_name(source);
        let dest = self.dir.join(&file);

        let bytes = fs::copy(source, &dest).with_context(|| {
            format!("failed to copy {} → {}", source.display(), dest.display())
        })?;
        let content_hash = hash::hash_file(&dest)
            .with_context(|| format!("failed to hash {}", dest.display()))?
            .to_hex()
            .to_string();

        let entry = BackupEntry {
            file,
            source: source_key,
            content_hash,
            bytes,
            reason: reason.to_string(),
            created_at: chrono::Utc::now(),
        };

        let mut manifest = BackupManifest::read_from(&self.dir)?;
        manifest.entries.push(entry.clone());
        manifest.write_to(&self.dir)?;

        log::info!(
            "backup: {} → {} ({})",
            source.display(),
            dest.display(),
            hash::short_hash(&entry.content_hash)
        );
        Ok(entry)
    }

    /// `{stem}.{timestamp}[-n].{ext}`, not yet present in the directory.
    fn unique_name(&self, source: &Path) -> String {
        let stem = source
            .file_stem()
            .map_or_else(|| "backup".to_string(), |s| s.to_string_lossy().into_owned());
        let ext = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S").to_string();

        let mut name = format!("{stem}.{stamp}{ext}");
        let mut n = 2;
        while self.dir.join(&name).exists() {
            name = format!("{stem}.{stamp}-{n}{ext}");
            n += 1;
        }
        name
    }

    /// All backups, oldest first.
    pub fn list(&self) -> Result<Vec<BackupEntry>> {
        Ok(BackupManifest::read_from(&self.dir)?.entries)
    }

    pub fn find(&self, file: &str) -> Result<Option<BackupEntry>> {
        Ok(BackupManifest::read_from(&self.dir)?.find(file).cloned())
    }

    /// Newest backup of `source`, if any.
    pub fn latest_for(&self, source: &Path) -> Result<Option<BackupEntry>> {
        let key = source_key(source);
        Ok(BackupManifest::read_from(&self.dir)?
            .latest_for(&key)
            .cloned())
    }

    /// Re-hash a backup copy and compare with the manifest.
    pub fn verify(&self, entry: &BackupEntry) -> VerifyResult {
        let path = self.dir.join(&entry.file);
        let (actual, ok) = if path.exists() {
            match hash::hash_file(&path) {
                Ok(h) => {
                    let hex = h.to_hex().to_string();
                    let ok = hex == entry.content_hash;
                    (hex, ok)
                }
                Err(e) => (format!("error: {e}"), false),
            }
        } else {
            ("MISSING".to_string(), false)
        };
        VerifyResult {
            file: entry.file.clone(),
            expected: entry.content_hash.clone(),
            actual,
            ok,
        }
    }

    /// Copy a backup over `target` after checking its hash.
    pub fn restore(&self, entry: &BackupEntry, target: &Path) -> Result<()> {
        let check = self.verify(entry);
        if !check.ok {
            anyhow::bail!(
                "backup {} failed verification (expected {}, got {})",
                entry.file,
                hash::short_hash(&check.expected),
                hash::short_hash(&check.actual)
            );
        }

        let src = self.dir.join(&entry.file);
        let mut tmp = target.as_os_str().to_owned();
        tmp.push(".restore.tmp");
        let tmp = PathBuf::from(tmp);
        fs::copy(&src, &tmp)
            .with_context(|| format!("failed to copy {} → {}", src.display(), tmp.display()))?;
        fs::rename(&tmp, target).with_context(|| {
            format!("failed to rename {} → {}", tmp.display(), target.display())
        })?;

        log::warn!("restored {} from backup {}", target.display(), entry.file);
        Ok(())
    }

    /// Entries `prune(keep)` would remove, without touching anything.
    pub fn prune_plan(&self, keep: usize) -> Result<Vec<BackupEntry>> {
        let manifest = BackupManifest::read_from(&self.dir)?;
        Ok(split_for_prune(manifest.entries, keep).1)
    }

    /// Keep the newest `keep` backups of each source, delete the rest.
    /// Returns the removed entries.
    pub fn prune(&self, keep: usize) -> Result<Vec<BackupEntry>> {
        let mut manifest = BackupManifest::read_from(&self.dir)?;
        let (kept, removed) = split_for_prune(std::mem::take(&mut manifest.entries), keep);
        manifest.entries = kept;

        for entry in &removed {
            let path = self.dir.join(&entry.file);
            match fs::remove_file(&path) {
                Ok(()) => log::info!("prune: removed {}", entry.file),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("prune: {} already gone", entry.file)
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to remove {}", path.display()))
                }
            }
        }
        manifest.write_to(&self.dir)?;
        Ok(removed)
    }

    /// Files in the directory that the manifest does not know about.
    pub fn orphans(&self) -> Result<Vec<PathBuf>> {
        let known: HashSet<String> = self.list()?.into_iter().map(|e| e.file).collect();
        let pattern = self.dir.join("*");
        let pattern_str = pattern.to_string_lossy();

        let mut orphans: Vec<PathBuf> = glob::glob(&pattern_str)
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy())
                    .is_some_and(|n| n != MANIFEST_FILE && !known.contains(&*n))
            })
            .collect();
        orphans.sort();
        Ok(orphans)
    }
}

/// Split oldest-first entries into (kept, removed), keeping the newest
/// `keep` of each source. Both halves stay oldest first.
fn split_for_prune(entries: Vec<BackupEntry>, keep: usize) -> (Vec<BackupEntry>, Vec<BackupEntry>) {
    let mut seen: Vec<(PathBuf, usize)> = Vec::new();
    let mut kept = Vec::new();
    let mut removed = Vec::new();

    for entry in entries.into_iter().rev() {
        let count = match seen.iter_mut().find(|(s, _)| *s == entry.source) {
            Some((_, c)) => {
                *c += 1;
                *c
            }
            None => {
                seen.push((entry.source.clone(), 1));
                1
            }
        };
        if count <= keep {
            kept.push(entry);
        } else {
            removed.push(entry);
        }
    }
    kept.reverse();
    removed.reverse();
    (kept, removed)
}

/// Canonical form of a source path so backups of the same file group together.
fn source_key(source: &Path) -> PathBuf {
    fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf())
}
