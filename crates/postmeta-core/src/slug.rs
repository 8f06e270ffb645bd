//! URL slug generation with collision resolution

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Default word budget for a generated slug.
pub const DEFAULT_MAX_WORDS: usize = 6;

/// Slug used when a title yields no usable words.
pub const UNTITLED: &str = "untitled";

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid slug regex"));

/// Whether `s` is a lowercase kebab-case slug.
pub fn is_valid_slug(s: &str) -> bool {
    SLUG_PATTERN.is_match(s)
}

/// Words of the title that make up a slug.
///
/// Only the text before the first colon counts. Characters outside
/// `[a-z0-9\s-]` are dropped after lowercasing; hyphen runs inside a word
/// collapse to one and words made only of hyphens vanish, so any join of the
/// result is a valid slug.
pub fn slug_words(title: &str) -> Vec<String> {
    let head = title.split(':').next().unwrap_or_default().to_lowercase();
    let cleaned: String = head
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    cleaned.split_whitespace().filter_map(normalize_word).collect()
}

fn normalize_word(word: &str) -> Option<String> {
    let parts: Vec<&str> = word.split('-').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("-"))
    }
}

/// Derive a slug from `title` that is not in `existing`.
///
/// Starts with the first `max_words` words, widens one word at a time on
/// collision, then falls back to numeric suffixes (`-2`, `-3`, ...) on the
/// all-words slug. Pure: the same inputs always give the same slug.
pub fn generate_slug(title: &str, existing: &HashSet<String>, max_words: usize) -> String {
    let words = slug_words(title);
    if words.is_empty() {
        return with_suffix(UNTITLED, existing);
    }

    let start = max_words.max(1).min(words.len());
    for n in start..=words.len() {
        let candidate = words[..n].join("-");
        if !existing.contains(&candidate) {
            return candidate;
        }
    }
    with_suffix(&words.join("-"), existing)
}

fn with_suffix(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|i| format!("{base}-{i}"))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Accumulator of slugs already handed out in a run.
///
/// Every slug that ends up in the output must pass through [`reserve`] or
/// [`generate`], otherwise uniqueness across the batch is not guaranteed.
///
/// [`reserve`]: SlugRegistry::reserve
/// [`generate`]: SlugRegistry::generate
#[derive(Debug, Clone)]
pub struct SlugRegistry {
    used: HashSet<String>,
    max_words: usize,
}

impl Default for SlugRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORDS)
    }
}

impl SlugRegistry {
    pub fn new(max_words: usize) -> Self {
        Self {
            used: HashSet::new(),
            max_words,
        }
    }

    /// Record an existing slug. Returns `false` if it was already taken.
    pub fn reserve(&mut self, slug: &str) -> bool {
        self.used.insert(slug.to_string())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.used.contains(slug)
    }

    /// Generate a fresh slug for `title` and record it.
    pub fn generate(&mut self, title: &str) -> String {
        let slug = generate_slug(title, &self.used, self.max_words);
        self.used.insert(slug.clone());
        slug
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
