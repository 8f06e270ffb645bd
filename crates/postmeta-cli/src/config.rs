//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Global configuration for postmeta
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub slug: SlugConfig,
    pub dates: DatesConfig,
    pub backups: BackupsConfig,
    pub feed: FeedConfig,
    pub subscribers: SubscribersConfig,
}

/// Data files, relative to the working directory unless absolute
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub csv: PathBuf,
    pub medium_posts: PathBuf,
    pub blog_content: PathBuf,
    pub episodes: PathBuf,
    pub image_dir: PathBuf,
    pub backup_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("data/blog-metadata.csv"),
            medium_posts: PathBuf::from("src/data/medium-posts.json"),
            blog_content: PathBuf::from("src/data/blog-content.json"),
            episodes: PathBuf::from("data/episodes.json"),
            image_dir: PathBuf::from("public/images/blog"),
            backup_dir: PathBuf::from("data/backups"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SlugConfig {
    pub max_words: usize,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            max_words: postmeta_core::slug::DEFAULT_MAX_WORDS,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DatesConfig {
    /// Year for legacy title prefixes that omit it
    pub default_year: i32,
    /// Publication dates before this are placeholders
    pub placeholder_before: NaiveDate,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            default_year: postmeta_core::dates::DEFAULT_YEAR,
            placeholder_before: postmeta_core::dates::default_placeholder_cutoff(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Backups kept per file by `backups prune`
    pub keep: usize,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self { keep: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    #[serde(deserialize_with = "deserialize_env_var")]
    pub url: Option<String>,
    pub request_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            request_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscribersConfig {
    #[serde(deserialize_with = "deserialize_env_var")]
    pub page_url: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub session_cookie: Option<String>,
    pub cache_file: PathBuf,
    pub default: u64,
}

impl Default for SubscribersConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            session_cookie: None,
            cache_file: PathBuf::from("data/subscriber-count.json"),
            default: 0,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./postmeta.toml (current directory)
    /// 2. ~/.config/postmeta/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("postmeta.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "postmeta") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
