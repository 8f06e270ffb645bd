use std::collections::HashSet;
use std::path::{Path, PathBuf};

use postmeta_core::{BlogPostRecord, MetadataTable};
use postmeta_pipeline::{
    commit_table, run_cleanup, run_merge, CleanupConfig, CleanupOptions, CommitOutcome,
    MergeConfig, MergeOptions,
};
use postmeta_store::BackupStore;
use tempfile::TempDir;

const EPISODES: &str = r#"[
    {"slug": "summer-sprint", "name": "Summer Sprint", "startDate": "2025-06-01", "endDate": "2025-08-31"},
    {"slug": "fall-launch", "name": "Fall Launch", "startDate": "2025-09-01", "endDate": "2025-11-30"}
]"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(csv: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blog-metadata.csv"), csv).unwrap();
        std::fs::write(dir.path().join("episodes.json"), EPISODES).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn csv(&self) -> PathBuf {
        self.path("blog-metadata.csv")
    }

    fn merge_config(&self, source: Option<PathBuf>) -> MergeConfig {
        MergeConfig {
            csv_path: self.csv(),
            source,
            episodes_path: self.path("episodes.json"),
            backup_dir: self.path("backups"),
            dry_run: false,
            options: MergeOptions::default(),
        }
    }

    fn cleanup_config(&self) -> CleanupConfig {
        CleanupConfig {
            csv_path: self.csv(),
            episodes_path: self.path("episodes.json"),
            backup_dir: self.path("backups"),
            dry_run: false,
            options: CleanupOptions::default(),
        }
    }
}

fn read(path: &Path) -> MetadataTable {
    MetadataTable::read(path).unwrap()
}

#[test]
fn merge_keeps_current_row_over_legacy_duplicate() {
    let fx = Fixture::new(
        "slug,hashId,title,pubDate,workDate,category,cluster\n\
         old-slug-123,cb4864b0cfc6,Old Foo,2001-01-01,,building,\n\
         ,cb4864b0cfc6,10/4: Foo Bar,2025-10-05,2025-10-04,building,\n",
    );

    let summary = run_merge(&fx.merge_config(None)).unwrap();
    assert!(summary.outcome.as_ref().is_some_and(|o| o.is_written()));
    assert_eq!(summary.rows, 1);
    assert_eq!(summary.report.discarded, 1);

    let table = read(&fx.csv());
    assert_eq!(table.records.len(), 1);
    let kept = &table.records[0];
    assert_eq!(kept.pub_date, "2025-10-05");
    assert_eq!(kept.slug, "foo-bar");
    assert_eq!(kept.cluster, "fall-launch");

    // Header order of the working file survives, missing columns appended
    assert_eq!(
        table.header[..7],
        ["slug", "hashId", "title", "pubDate", "workDate", "category", "cluster"]
    );
    assert_eq!(table.header.len(), 11);

    let backups = BackupStore::new(&fx.path("backups")).unwrap();
    let entries = backups.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(backups.verify(&entries[0]).ok);
}

#[test]
fn merge_from_medium_export_adds_new_posts() {
    let fx = Fixture::new("slug,hashId,title,pubDate\nfoo,000000000001,Foo,2025-01-01\n");
    let export = fx.path("medium-posts.json");
    std::fs::write(
        &export,
        r#"[
            {"title": "Foo", "guid": "https://medium.com/p/000000000001", "publishedAtISO": "2025-01-01T10:00:00Z"},
            {"title": "Foo: again", "url": "https://medium.com/@me/foo-000000000002?source=rss", "publishedAtISO": "2025-02-01T10:00:00Z"}
        ]"#,
    )
    .unwrap();

    let summary = run_merge(&fx.merge_config(Some(export))).unwrap();
    assert_eq!(summary.report.added, 1);

    let table = read(&fx.csv());
    let slugs: HashSet<&str> = table.records.iter().map(|r| r.slug.as_str()).collect();
    let hashes: HashSet<&str> = table.records.iter().map(|r| r.hash_id.as_str()).collect();
    assert_eq!(table.records.len(), 2);
    assert_eq!(slugs.len(), 2);
    assert_eq!(hashes.len(), 2);
    assert_eq!(table.records[1].pub_date, "2025-02-01");
}

#[test]
fn dry_run_leaves_file_untouched() {
    let original = "slug,hashId,title,pubDate\na,000000000001,A,2001-01-01\nb,000000000001,B,2025-01-01\n";
    let fx = Fixture::new(original);
    let config = MergeConfig {
        dry_run: true,
        ..fx.merge_config(None)
    };

    let summary = run_merge(&config).unwrap();
    assert!(summary.outcome.is_none());
    assert_eq!(summary.rows, 1);
    assert_eq!(std::fs::read_to_string(fx.csv()).unwrap(), original);
    assert!(!fx.path("backups").join("manifest.json").exists());
}

#[test]
fn failed_verification_restores_backup_byte_for_byte() {
    let original = "slug,hashId,title\r\n\"keep, me\",000000000001,\"Quoted \"\"title\"\"\"\r\n";
    let fx = Fixture::new(original);
    let backups = BackupStore::new(&fx.path("backups")).unwrap();

    let dup = |slug: &str| BlogPostRecord {
        slug: slug.into(),
        hash_id: "000000000009".into(),
        title: "Dup".into(),
        ..Default::default()
    };
    let table = MetadataTable::with_records(vec![dup("x"), dup("y")]);

    let outcome = commit_table(&table, &fx.csv(), &backups, "test").unwrap();
    assert!(matches!(outcome, CommitOutcome::RolledBack { .. }));
    assert_eq!(std::fs::read(fx.csv()).unwrap(), original.as_bytes());
}

#[test]
fn cleanup_normalizes_legacy_rows_and_is_idempotent() {
    let fx = Fixture::new(
        "slug,hashId,title,chatDate,imageSlug,workDate,pubDate,category,cluster,featured,notes\n\
         ,cb4864b0cfc6,\"7/12-7/13, 7/15 chat: Big Refactor\",,,,10/5/2025,Building,,,\n\
         big-refactor,000000000002,Big Refactor,,big-refactor,2025-09-10,2025-09-12,insight,,true,\n",
    );

    let summary = run_cleanup(&fx.cleanup_config()).unwrap();
    assert!(summary.outcome.as_ref().is_some_and(|o| o.is_written()));

    let table = read(&fx.csv());
    let first = &table.records[0];
    assert_eq!(first.title, "Big Refactor");
    assert_eq!(first.chat_date, "7/12/2025");
    assert_eq!(first.work_date, "2025-07-12");
    assert_eq!(first.pub_date, "2025-10-05");
    assert_eq!(first.category, "building");
    assert_eq!(first.cluster, "summer-sprint");
    // Existing owner of "big-refactor" keeps it
    assert_eq!(first.slug, "big-refactor-2");
    assert_eq!(first.image_slug, "big-refactor-2");

    let second = &table.records[1];
    assert_eq!(second.slug, "big-refactor");
    assert_eq!(second.cluster, "fall-launch");
    assert_eq!(second.featured, "true");

    let again = run_cleanup(&fx.cleanup_config()).unwrap();
    assert!(again.report.changes.is_empty());
    assert!(again.outcome.is_none());
}

#[test]
fn cleanup_refuses_to_drop_malformed_rows() {
    let fx = Fixture::new("slug,hashId,title,category\n,000000000001,A,Building\nbroken,row\n");
    let err = run_cleanup(&fx.cleanup_config()).unwrap_err();
    assert!(err.to_string().contains("malformed"));
}

#[test]
fn merge_refuses_to_drop_malformed_rows() {
    let original = "slug,hashId,title,pubDate\n\
                    a,000000000001,A,2025-01-01\n\
                    b,000000000002,B,2025-02-01,extra\n";
    let fx = Fixture::new(original);

    let dry = MergeConfig {
        dry_run: true,
        ..fx.merge_config(None)
    };
    let summary = run_merge(&dry).unwrap();
    assert_eq!(summary.report.malformed_rows, 1);

    let err = run_merge(&fx.merge_config(None)).unwrap_err();
    assert!(err.to_string().contains("malformed"));
    assert_eq!(std::fs::read_to_string(fx.csv()).unwrap(), original);
}
