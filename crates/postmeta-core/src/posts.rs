//! JSON content stores exported from Medium
//!
//! - `medium-posts.json`: array of post summaries
//! - `blog-content.json`: map from hash ID to full post content

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dates::standardize_date;
use crate::hash_id::extract_hash_id;
use crate::record::BlogPostRecord;

/// Entry of `medium-posts.json`. Keys not modelled here are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediumPost {
    pub title: String,
    pub excerpt: String,
    pub url: String,
    pub published_at: String,
    #[serde(rename = "publishedAtISO")]
    pub published_at_iso: String,
    pub author: String,
    pub reading_time: Option<String>,
    pub tags: Vec<String>,
    pub guid: String,
    pub slug: String,
    pub work_date: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MediumPost {
    /// Hash ID from the GUID, falling back to the URL.
    pub fn hash_id(&self) -> Option<String> {
        extract_hash_id(&self.guid).or_else(|| extract_hash_id(&self.url))
    }

    /// Publication date as `YYYY-MM-DD` when it can be determined.
    pub fn pub_date(&self) -> String {
        let raw = if self.published_at_iso.is_empty() {
            &self.published_at
        } else {
            &self.published_at_iso
        };
        standardize_date(raw)
    }

    /// Metadata row for this post. Fields the export does not know about
    /// (category, cluster, image) are left blank for later passes.
    pub fn to_record(&self) -> Option<BlogPostRecord> {
        let hash_id = self.hash_id()?;
        Some(BlogPostRecord {
            slug: self.slug.clone(),
            hash_id,
            title: self.title.trim().to_string(),
            image_slug: self.slug.clone(),
            work_date: standardize_date(&self.work_date),
            pub_date: self.pub_date(),
            ..Default::default()
        })
    }
}

/// Value of `blog-content.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogContent {
    pub title: String,
    pub subtitle: String,
    /// Post body as HTML.
    pub content: String,
    pub author: String,
    pub canonical_link: String,
    pub published_date: String,
}

/// `blog-content.json`, keyed by hash ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentStore {
    entries: BTreeMap<String, BlogContent>,
}

impl ContentStore {
    /// Load the store, or an empty one if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        read_json_or_default(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn get(&self, hash_id: &str) -> Option<&BlogContent> {
        self.entries.get(hash_id)
    }

    /// Insert or replace. Returns `true` if the hash ID was new.
    pub fn upsert(&mut self, hash_id: String, content: BlogContent) -> bool {
        self.entries.insert(hash_id, content).is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BlogContent)> {
        self.entries.iter()
    }
}

/// Load `medium-posts.json`; a missing file is an empty list.
pub fn load_posts(path: &Path) -> Result<Vec<MediumPost>> {
    read_json_or_default(path)
}

pub fn save_posts(path: &Path, posts: &[MediumPost]) -> Result<()> {
    write_json(path, &posts)
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        log::debug!("{} not found, using empty store", path.display());
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
