//! Newsletter subscriber count with ordered fallbacks
//!
//! env → scrape → cache → default. Live values (env, scrape) are written
//! back to the cache file so later runs without network still have them.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use postmeta_core::{first_success, Resolved, Strategy};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::http::fetch_text_with;

pub const COUNT_ENV: &str = "LINKEDIN_SUBSCRIBER_COUNT";
pub const COOKIE_ENV: &str = "LINKEDIN_SESSION_COOKIE";

// "1,234 subscribers", "1.2K subscribers"
static SUBSCRIBERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*([km])?\s+subscribers").expect("valid regex")
});

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Newsletter page to scrape; scraping is skipped without it.
    pub page_url: Option<String>,
    /// Session cookie; falls back to `LINKEDIN_SESSION_COOKIE`.
    pub session_cookie: Option<String>,
    pub cache_file: PathBuf,
    pub default: u64,
}

/// Contents of the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCount {
    pub count: u64,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

/// Parse a count such as `1,234` or `1.2K` followed by "subscribers".
pub fn parse_subscriber_count(text: &str) -> Option<u64> {
    let caps = SUBSCRIBERS.captures(text)?;
    let number: f64 = caps[1].replace(',', "").parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(s) if s == "k" => 1_000.0,
        Some(s) if s == "m" => 1_000_000.0,
        _ => 1.0,
    };
    Some((number * scale).round() as u64)
}

pub fn read_cache(path: &Path) -> Result<Option<CachedCount>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cached = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(cached))
}

pub fn write_cache(path: &Path, cached: &CachedCount) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(cached)?)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to rename {} → {}", tmp.display(), path.display()))?;
    Ok(())
}

/// Resolve the subscriber count from the environment, page, cache or default.
pub fn resolve_subscriber_count(config: &SubscriberConfig) -> Result<Resolved<u64>> {
    let env_count = std::env::var(COUNT_ENV).ok();
    let cookie = config
        .session_cookie
        .clone()
        .or_else(|| std::env::var(COOKIE_ENV).ok());
    resolve_with(config, env_count, cookie, |url, cookie| {
        let header = format!("li_at={cookie}");
        Ok(fetch_text_with(url, &[("Cookie", header.as_str())])?)
    })
}

fn resolve_with(
    config: &SubscriberConfig,
    env_count: Option<String>,
    cookie: Option<String>,
    scrape: impl FnOnce(&str, &str) -> Result<String>,
) -> Result<Resolved<u64>> {
    let strategies = vec![
        Strategy::new("env", move || {
            let Some(raw) = env_count.filter(|s| !s.trim().is_empty()) else {
                return Ok(None);
            };
            let count = raw
                .trim()
                .replace(',', "")
                .parse::<u64>()
                .with_context(|| format!("{COUNT_ENV}='{raw}' is not a number"))?;
            Ok(Some(count))
        }),
        Strategy::new("scrape", || {
            let (Some(url), Some(cookie)) = (config.page_url.as_deref(), cookie.as_deref()) else {
                log::debug!("scrape skipped: page_url or session cookie not set");
                return Ok(None);
            };
            let html = scrape(url, cookie)?;
            match parse_subscriber_count(&html) {
                Some(count) => Ok(Some(count)),
                None => anyhow::bail!("no subscriber count on {url}"),
            }
        }),
        Strategy::new("cache", || Ok(read_cache(&config.cache_file)?.map(|c| c.count))),
        Strategy::new("default", || Ok(Some(config.default))),
    ];

    let resolved = first_success(strategies).unwrap_or(Resolved {
        strategy: "default",
        value: config.default,
    });
    log::info!(
        "subscriber count {} (from {})",
        resolved.value,
        resolved.strategy
    );

    if matches!(resolved.strategy, "env" | "scrape") {
        let cached = CachedCount {
            count: resolved.value,
            source: resolved.strategy.to_string(),
            updated_at: Utc::now(),
        };
        if let Err(e) = write_cache(&config.cache_file, &cached) {
            log::warn!("subscriber cache not updated: {e:#}");
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> SubscriberConfig {
        SubscriberConfig {
            page_url: Some("https://www.linkedin.com/newsletters/x".into()),
            session_cookie: None,
            cache_file: dir.join("subscribers.json"),
            default: 100,
        }
    }

    fn no_scrape(_: &str, _: &str) -> Result<String> {
        panic!("scrape should not run")
    }

    #[test]
    fn parse_counts() {
        assert_eq!(parse_subscriber_count("<span>1,234 subscribers</span>"), Some(1234));
        assert_eq!(parse_subscriber_count("1.2K Subscribers"), Some(1200));
        assert_eq!(parse_subscriber_count("12 subscribers"), Some(12));
        assert_eq!(parse_subscriber_count("no count here"), None);
    }

    #[test]
    fn env_wins_and_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let resolved = resolve_with(&cfg, Some("2,500".into()), Some("c".into()), no_scrape).unwrap();
        assert_eq!(resolved, Resolved { strategy: "env", value: 2500 });

        let cached = read_cache(&cfg.cache_file).unwrap().unwrap();
        assert_eq!(cached.count, 2500);
        assert_eq!(cached.source, "env");
    }

    #[test]
    fn unwritable_cache_keeps_resolved_count() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let cfg = SubscriberConfig {
            cache_file: blocker.join("subscribers.json"),
            ..config(dir.path())
        };
        let resolved = resolve_with(&cfg, Some("42".into()), None, no_scrape).unwrap();
        assert_eq!(resolved, Resolved { strategy: "env", value: 42 });
        assert!(!cfg.cache_file.exists());
    }

    #[test]
    fn scrape_when_env_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let resolved = resolve_with(&cfg, None, Some("cookie".into()), |_, cookie| {
            assert_eq!(cookie, "cookie");
            Ok("<p>3,100 subscribers</p>".into())
        })
        .unwrap();
        assert_eq!(resolved.strategy, "scrape");
        assert_eq!(resolved.value, 3100);
    }

    #[test]
    fn failed_scrape_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        write_cache(
            &cfg.cache_file,
            &CachedCount {
                count: 777,
                source: "scrape".into(),
                updated_at: Utc::now(),
            },
        )
        .unwrap();
        let before = std::fs::read_to_string(&cfg.cache_file).unwrap();

        let resolved = resolve_with(&cfg, Some("not a number".into()), Some("c".into()), |_, _| {
            anyhow::bail!("HTTP 403")
        })
        .unwrap();
        assert_eq!(resolved, Resolved { strategy: "cache", value: 777 });
        // Cache not rewritten from itself
        assert_eq!(std::fs::read_to_string(&cfg.cache_file).unwrap(), before);
    }

    #[test]
    fn default_without_anything() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SubscriberConfig {
            page_url: None,
            ..config(dir.path())
        };
        let resolved = resolve_with(&cfg, None, Some("c".into()), no_scrape).unwrap();
        assert_eq!(resolved, Resolved { strategy: "default", value: 100 });
        assert!(!cfg.cache_file.exists());
    }
}
