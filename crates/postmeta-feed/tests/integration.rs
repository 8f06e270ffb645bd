use std::path::PathBuf;

use postmeta_core::posts::load_posts;
use postmeta_core::ContentStore;
use postmeta_feed::{run_import, FeedSource, ImportConfig};
use postmeta_store::BackupStore;
use tempfile::TempDir;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:content="http://purl.org/rss/1.0/modules/content/" version="2.0">
<channel>
  <item>
    <title><![CDATA[Launch Day]]></title>
    <link>https://medium.com/@me/launch-day-000000000002?source=rss-1</link>
    <guid isPermaLink="false">https://medium.com/p/000000000002</guid>
    <dc:creator><![CDATA[Me]]></dc:creator>
    <pubDate>Mon, 06 Oct 2025 08:00:00 GMT</pubDate>
    <content:encoded><![CDATA[<figure><img src="https://cdn/launch.png"/></figure><p>We shipped.</p>]]></content:encoded>
  </item>
  <item>
    <title><![CDATA[Big Refactor]]></title>
    <link>https://medium.com/@me/big-refactor-cb4864b0cfc6?source=rss-1</link>
    <guid isPermaLink="false">https://medium.com/p/cb4864b0cfc6</guid>
    <dc:creator><![CDATA[Me]]></dc:creator>
    <pubDate>Sun, 05 Oct 2025 14:30:00 GMT</pubDate>
    <content:encoded><![CDATA[<p>Tore it down.</p>]]></content:encoded>
  </item>
</channel>
</rss>"#;

fn setup() -> (TempDir, ImportConfig) {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("feed.xml");
    std::fs::write(&feed, FEED).unwrap();
    let config = ImportConfig {
        source: FeedSource::File(feed),
        posts_path: dir.path().join("data/medium-posts.json"),
        content_path: dir.path().join("data/blog-content.json"),
        backup_dir: dir.path().join("backups"),
        dry_run: false,
    };
    (dir, config)
}

fn backups(dir: &TempDir) -> BackupStore {
    BackupStore::new(&dir.path().join("backups")).unwrap()
}

#[test]
fn import_into_empty_stores() {
    let (dir, config) = setup();
    let summary = run_import(&config).unwrap();
    assert_eq!(summary.added, 2);
    assert_eq!(summary.contents_added, 2);

    let posts = load_posts(&config.posts_path).unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Launch Day");
    assert_eq!(posts[1].hash_id().as_deref(), Some("cb4864b0cfc6"));

    let contents = ContentStore::load(&config.content_path).unwrap();
    assert!(contents.get("000000000002").unwrap().content.contains("launch.png"));

    // Nothing existed, so nothing was backed up
    assert!(backups(&dir).list().unwrap().is_empty());
}

#[test]
fn reimport_backs_up_and_preserves_local_fields() {
    let (dir, config) = setup();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(
        &config.posts_path,
        r#"[{"title": "Old", "guid": "https://medium.com/p/cb4864b0cfc6", "slug": "big-refactor", "featuredImage": "x.png"}]"#,
    )
    .unwrap();

    let summary = run_import(&config).unwrap();
    assert_eq!(summary.added, 1);
    assert_eq!(summary.updated, 1);

    let posts = load_posts(&config.posts_path).unwrap();
    let refactor = posts
        .iter()
        .find(|p| p.slug == "big-refactor")
        .unwrap();
    assert_eq!(refactor.title, "Big Refactor");
    assert_eq!(refactor.extra.get("featuredImage").and_then(|v| v.as_str()), Some("x.png"));

    let entries = backups(&dir).list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(PathBuf::from(&entries[0].file).extension().unwrap(), "json");
}

#[test]
fn dry_run_writes_nothing() {
    let (_dir, config) = setup();
    let config = ImportConfig {
        dry_run: true,
        ..config
    };
    let summary = run_import(&config).unwrap();
    assert_eq!(summary.added, 2);
    assert!(!config.posts_path.exists());
    assert!(!config.content_path.exists());
}

#[test]
fn changed_body_alone_rewrites_content_store() {
    let (_dir, config) = setup();
    run_import(&config).unwrap();

    let FeedSource::File(feed) = &config.source else {
        unreachable!()
    };
    std::fs::write(feed, FEED.replace("launch.png", "launch-v2.png")).unwrap();

    let summary = run_import(&config).unwrap();
    assert_eq!(summary.added, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.contents_updated, 1);

    let contents = ContentStore::load(&config.content_path).unwrap();
    assert!(contents.get("000000000002").unwrap().content.contains("launch-v2.png"));
}
