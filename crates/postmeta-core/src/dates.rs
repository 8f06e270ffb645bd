//! Date normalization for hand-entered and exported date strings

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

static ISO_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

static ISO_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ].*)?$").expect("valid regex")
});

static US_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").expect("valid regex"));

static WEEKDAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("valid regex")
});

// "8/12: Title", "7/12-7/13, 7/15 chat: Title", "8/3/2025 chats: Title"
static TITLE_DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?[\d/,\s-]*(?:chats?)?\s*:\s*(.*)$")
        .expect("valid regex")
});

/// Year assumed for legacy title prefixes that omit it.
pub const DEFAULT_YEAR: i32 = 2025;

/// Dates before this are treated as export placeholders unless configured otherwise.
pub fn default_placeholder_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid cutoff date")
}

/// Strict `YYYY-MM-DD` parse.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if !ISO_STRICT.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Lenient parse of the shapes found in the metadata file.
///
/// Accepts ISO dates (optionally with a time part or unpadded fields),
/// `M/D/YYYY`, `M/D/YY` (20YY) and either of those behind a weekday name.
pub fn parse_loose(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let s = WEEKDAY_PREFIX
        .find(s)
        .map_or(s, |m| &s[m.end()..])
        .trim();

    if let Some(c) = ISO_LOOSE.captures(s) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = US_DATE.captures(s) {
        return ymd(&c[3], &c[1], &c[2]);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let mut y: i32 = year.parse().ok()?;
    // Only M/D/YY captures a two-digit year
    if year.len() == 2 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, month.parse().ok()?, day.parse().ok()?)
}

/// Normalize a date string to `YYYY-MM-DD`.
///
/// Best effort: values that cannot be understood are returned unchanged
/// (with a warning) and must be tolerated downstream. Blank stays blank.
/// Applying it twice gives the same result as applying it once.
pub fn standardize_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return raw.to_string();
    }
    match parse_loose(raw) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => {
            log::warn!("unrecognized date format: '{raw}'");
            raw.to_string()
        }
    }
}

/// Whether a publication date is a placeholder rather than a real date.
///
/// Blank, unparseable and pre-`cutoff` values are placeholders; exports use
/// sentinel dates like `2001-01-01` for posts without a known date.
pub fn is_placeholder_date(raw: &str, cutoff: NaiveDate) -> bool {
    parse_loose(raw).is_none_or(|d| d < cutoff)
}

/// Result of stripping a legacy date prefix from a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDate {
    /// First date of the prefix as `M/D/YYYY`.
    pub chat_date: Option<String>,
    pub clean_title: String,
}

/// Split a legacy `"M/D: Title"` style prefix off a title.
///
/// The prefix may list several dates or ranges and end in `chat`. Only the
/// first date is kept; `default_year` fills in a missing year. Titles without
/// a recognizable prefix come back unchanged with no date.
pub fn extract_title_date(title: &str, default_year: i32) -> TitleDate {
    let unchanged = || TitleDate {
        chat_date: None,
        clean_title: title.trim().to_string(),
    };

    let Some(c) = TITLE_DATE_PREFIX.captures(title) else {
        return unchanged();
    };
    let rest = c[4].trim();
    if rest.is_empty() {
        return unchanged();
    }
    let year = c.get(3).map_or_else(|| default_year.to_string(), |m| m.as_str().to_string());
    let Some(date) = ymd(&year, &c[1], &c[2]) else {
        return unchanged();
    };

    TitleDate {
        chat_date: Some(format!("{}/{}/{}", date.month(), date.day(), date.year())),
        clean_title: rest.to_string(),
    }
}

/// Whether the title still carries a legacy date prefix.
pub fn has_title_date_prefix(title: &str) -> bool {
    extract_title_date(title, 2000).chat_date.is_some()
}
