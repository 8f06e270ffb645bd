//! Upsert feed items into `medium-posts.json` and `blog-content.json`

use std::sync::LazyLock;

use postmeta_core::{extract_hash_id, BlogContent, ContentStore, MediumPost};
use regex::Regex;

use crate::rss::FeedItem;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p[^>]*>(.*?)</p>").expect("valid regex"));
static SUBTITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h4[^>]*>(.*?)</h4>").expect("valid regex"));

const EXCERPT_CHARS: usize = 200;
const WORDS_PER_MINUTE: usize = 230;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    /// Items without a recognizable hash ID.
    pub skipped: usize,
    pub contents_added: usize,
    /// Stored content replaced because the feed body changed.
    pub contents_updated: usize,
}

impl ImportSummary {
    /// Whether either store differs from what was loaded.
    pub fn has_changes(&self) -> bool {
        self.added + self.updated + self.contents_added + self.contents_updated > 0
    }
}

/// Merge `items` into the post list and content store.
///
/// Posts are matched by hash ID. Existing posts keep the fields the feed
/// does not carry (slug, workDate, unknown keys). The list is re-sorted
/// newest first.
pub fn import_feed(
    items: &[FeedItem],
    posts: &mut Vec<MediumPost>,
    contents: &mut ContentStore,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for item in items {
        let Some(hash_id) = extract_hash_id(&item.guid).or_else(|| extract_hash_id(&item.link))
        else {
            log::warn!("feed item '{}' has no hash ID, skipping", item.title);
            summary.skipped += 1;
            continue;
        };

        let fresh = post_from_item(item);
        match posts.iter_mut().find(|p| p.hash_id().as_deref() == Some(hash_id.as_str())) {
            Some(existing) => {
                let before = existing.clone();
                existing.title = fresh.title;
                existing.url = fresh.url;
                existing.guid = fresh.guid;
                existing.published_at = fresh.published_at;
                existing.published_at_iso = fresh.published_at_iso;
                existing.author = fresh.author;
                existing.tags = fresh.tags;
                if !fresh.excerpt.is_empty() {
                    existing.excerpt = fresh.excerpt;
                    existing.reading_time = fresh.reading_time;
                }
                if *existing != before {
                    log::debug!("{hash_id}: updated '{}'", existing.title);
                    summary.updated += 1;
                }
            }
            None => {
                log::info!("{hash_id}: new post '{}'", fresh.title);
                posts.push(fresh);
                summary.added += 1;
            }
        }

        if !item.content.is_empty() {
            let content = content_from_item(item);
            match contents.get(&hash_id) {
                None => summary.contents_added += 1,
                Some(stored) if *stored != content => {
                    log::debug!("{hash_id}: content changed");
                    summary.contents_updated += 1;
                }
                Some(_) => continue,
            }
            contents.upsert(hash_id, content);
        }
    }

    // ISO timestamps sort chronologically; posts without one go last
    posts.sort_by(|a, b| b.published_at_iso.cmp(&a.published_at_iso));
    summary
}

fn post_from_item(item: &FeedItem) -> MediumPost {
    let published = item.published();
    let text = plain_text(&item.content);
    let excerpt = first_paragraph(&item.content)
        .map(|p| truncate_chars(&p, EXCERPT_CHARS))
        .unwrap_or_default();

    MediumPost {
        title: item.title.clone(),
        excerpt,
        url: strip_query(&item.link).to_string(),
        published_at: item.pub_date.clone(),
        published_at_iso: published
            .map(|d| d.with_timezone(&chrono::Utc).format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
            .unwrap_or_default(),
        author: item.author.clone(),
        reading_time: (!text.is_empty()).then(|| reading_time(&text)),
        tags: item.categories.clone(),
        guid: item.guid.clone(),
        ..Default::default()
    }
}

fn content_from_item(item: &FeedItem) -> BlogContent {
    BlogContent {
        title: item.title.clone(),
        subtitle: SUBTITLE
            .captures(&item.content)
            .map(|c| plain_text(&c[1]))
            .unwrap_or_default(),
        content: item.content.clone(),
        author: item.author.clone(),
        canonical_link: strip_query(&item.link).to_string(),
        published_date: item
            .published()
            .map(|d| d.date_naive().to_string())
            .unwrap_or_default(),
    }
}

fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Tags removed, common entities decoded, whitespace collapsed.
fn plain_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_paragraph(html: &str) -> Option<String> {
    PARAGRAPH
        .captures_iter(html)
        .map(|c| plain_text(&c[1]))
        .find(|p| !p.is_empty())
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => format!("{}…", s[..i].trim_end()),
        None => s.to_string(),
    }
}

fn reading_time(text: &str) -> String {
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(hash: &str, title: &str, date: &str) -> FeedItem {
        FeedItem {
            title: title.into(),
            link: format!("https://medium.com/@me/post-{hash}?source=rss"),
            guid: format!("https://medium.com/p/{hash}"),
            pub_date: date.into(),
            author: "Me".into(),
            categories: vec!["rust".into()],
            content: "<h3>T</h3><h4>A subtitle</h4><p>First &amp; best paragraph.</p><p>Second.</p>"
                .into(),
        }
    }

    #[test]
    fn adds_new_posts_newest_first() {
        let mut posts = Vec::new();
        let mut contents = ContentStore::default();
        let items = vec![
            item("000000000001", "Older", "Sun, 05 Oct 2025 14:30:00 GMT"),
            item("000000000002", "Newer", "Mon, 06 Oct 2025 08:00:00 GMT"),
        ];
        let summary = import_feed(&items, &mut posts, &mut contents);
        assert_eq!(summary.added, 2);
        assert_eq!(summary.contents_added, 2);
        assert_eq!(posts[0].title, "Newer");
        assert_eq!(posts[0].published_at_iso, "2025-10-06T08:00:00.000Z");
        assert_eq!(posts[0].url, "https://medium.com/@me/post-000000000002");
        assert_eq!(posts[0].excerpt, "First & best paragraph.");
        assert_eq!(posts[0].reading_time.as_deref(), Some("1 min read"));

        let content = contents.get("000000000001").unwrap();
        assert_eq!(content.subtitle, "A subtitle");
        assert_eq!(content.published_date, "2025-10-05");
    }

    #[test]
    fn existing_post_keeps_local_fields() {
        let mut posts = vec![MediumPost {
            title: "Old title".into(),
            guid: "https://medium.com/p/000000000001".into(),
            slug: "my-slug".into(),
            work_date: "2025-10-01".into(),
            ..Default::default()
        }];
        let mut contents = ContentStore::default();
        let items = vec![item("000000000001", "New title", "Sun, 05 Oct 2025 14:30:00 GMT")];

        let summary = import_feed(&items, &mut posts, &mut contents);
        assert_eq!(summary.added, 0);
        assert_eq!(summary.updated, 1);
        assert_eq!(posts[0].title, "New title");
        assert_eq!(posts[0].slug, "my-slug");
        assert_eq!(posts[0].work_date, "2025-10-01");

        // Same feed again: nothing changes
        let again = import_feed(&items, &mut posts, &mut contents);
        assert_eq!(again.updated, 0);
        assert_eq!(again.contents_added, 0);
        assert_eq!(again.contents_updated, 0);
        assert!(!again.has_changes());
    }

    #[test]
    fn changed_body_updates_content_only() {
        let mut posts = Vec::new();
        let mut contents = ContentStore::default();
        let mut it = item("000000000001", "Post", "Sun, 05 Oct 2025 14:30:00 GMT");
        import_feed(std::slice::from_ref(&it), &mut posts, &mut contents);

        it.content = it.content.replace("<p>Second.</p>", "<p>Second, revised.</p>");
        let summary = import_feed(std::slice::from_ref(&it), &mut posts, &mut contents);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.contents_added, 0);
        assert_eq!(summary.contents_updated, 1);
        assert!(summary.has_changes());
        assert!(contents.get("000000000001").unwrap().content.contains("revised"));
    }

    #[test]
    fn items_without_hash_skipped() {
        let mut it = item("000000000001", "X", "");
        it.guid = "urn:x".into();
        it.link = "https://example.com/x".into();
        let mut posts = Vec::new();
        let summary = import_feed(&[it], &mut posts, &mut ContentStore::default());
        assert_eq!(summary.skipped, 1);
        assert!(posts.is_empty());
    }

    #[test]
    fn truncation_and_reading_time() {
        assert_eq!(truncate_chars("abcdef", 3), "abc…");
        assert_eq!(truncate_chars("abc", 3), "abc");
        let long = vec!["word"; 500].join(" ");
        assert_eq!(reading_time(&long), "3 min read");
    }
}
