//! Episode table: named, date-ranged chapters that posts are clustered into
//!
//! The table lives in a single `episodes.json` file (array of objects with
//! camelCase keys) shared by the site build and these tools.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::parse_loose;

/// One narrative chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub theme: String,
}

impl Episode {
    /// Inclusive range check.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    fn overlaps(&self, other: &Episode) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}

/// Ordered episode list. Order matters: on overlapping ranges the
/// earliest-listed episode wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeTable {
    episodes: Vec<Episode>,
}

impl EpisodeTable {
    pub fn new(episodes: Vec<Episode>) -> Self {
        Self { episodes }
    }

    /// Load `episodes.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read episode table: {}", path.display()))?;
        let table = Self::from_json(&content)
            .with_context(|| format!("failed to parse episode table: {}", path.display()))?;
        log::debug!("loaded {} episodes from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        for ep in &table.episodes {
            if ep.start_date > ep.end_date {
                anyhow::bail!(
                    "episode '{}' starts ({}) after it ends ({})",
                    ep.slug,
                    ep.start_date,
                    ep.end_date
                );
            }
        }
        Ok(table)
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.slug == slug)
    }

    /// First episode (in list order) whose range contains `date`.
    pub fn episode_for(&self, date: NaiveDate) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.contains(date))
    }

    /// Pairs of overlapping episodes, by slug, in list order.
    pub fn overlaps(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (i, a) in self.episodes.iter().enumerate() {
            for b in &self.episodes[i + 1..] {
                if a.overlaps(b) {
                    pairs.push((a.slug.as_str(), b.slug.as_str()));
                }
            }
        }
        pairs
    }
}

/// Episode slug for a work date, or `""` when unassigned.
///
/// Unparseable dates are unassigned. On overlap the earliest-listed
/// episode wins.
pub fn find_episode<'a>(work_date: &str, table: &'a EpisodeTable) -> &'a str {
    parse_loose(work_date)
        .and_then(|d| table.episode_for(d))
        .map_or("", |e| e.slug.as_str())
}
