//! Directory listing of post images

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions tried after the bare `imageSlug`, in order.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// File names present in the image directory.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    dir: PathBuf,
    names: HashSet<String>,
}

impl ImageIndex {
    /// List `dir`. A missing directory yields an empty index.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut names = HashSet::new();
        if !dir.exists() {
            log::warn!("image directory {} does not exist", dir.display());
            return Ok(Self {
                dir: dir.to_path_buf(),
                names,
            });
        }
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to list {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.insert(name.to_string());
                }
            }
        }
        log::debug!("{} images in {}", names.len(), dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    /// Build from a list of file names (tests, dry runs).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: PathBuf::new(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// File name for `image_slug`: as-is, then with each known extension.
    pub fn find(&self, image_slug: &str) -> Option<String> {
        let slug = image_slug.trim();
        if slug.is_empty() {
            return None;
        }
        if self.names.contains(slug) {
            return Some(slug.to_string());
        }
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| format!("{slug}.{ext}"))
            .find(|name| self.names.contains(name))
    }
}
