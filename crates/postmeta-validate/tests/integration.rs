use std::path::Path;

use postmeta_core::dates::default_placeholder_cutoff;
use postmeta_validate::{validate, Severity, ValidateConfig};
use tempfile::TempDir;

const HEADER: &str = "slug,hashId,title,chatDate,imageSlug,workDate,pubDate,category,cluster,featured,notes";

const EPISODES: &str = r#"[
    {"slug": "summer-sprint", "name": "Summer Sprint", "startDate": "2025-06-01", "endDate": "2025-08-31"},
    {"slug": "fall-launch", "name": "Fall Launch", "startDate": "2025-09-01", "endDate": "2025-11-30"}
]"#;

fn setup(rows: &[&str], images: &[&str]) -> (TempDir, ValidateConfig) {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("blog-metadata.csv");
    let mut text = format!("{HEADER}\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    std::fs::write(&csv, text).unwrap();
    std::fs::write(dir.path().join("episodes.json"), EPISODES).unwrap();

    let image_dir = dir.path().join("images");
    std::fs::create_dir(&image_dir).unwrap();
    for name in images {
        touch(&image_dir.join(name));
    }

    let config = ValidateConfig {
        csv_path: csv,
        episodes_path: dir.path().join("episodes.json"),
        image_dir,
        placeholder_cutoff: default_placeholder_cutoff(),
    };
    (dir, config)
}

fn touch(path: &Path) {
    std::fs::write(path, b"\x89PNG").unwrap();
}

#[test]
fn clean_file_has_no_errors() {
    let (_dir, config) = setup(
        &[
            "big-refactor,cb4864b0cfc6,Big Refactor,7/12/2025,big-refactor,2025-07-12,2025-10-05,building,summer-sprint,,",
            "launch-day,000000000002,Launch Day,,launch-day,2025-09-02,2025-09-03,insight,fall-launch,true,",
        ],
        &["big-refactor.png", "launch-day.webp"],
    );
    let report = validate(&config).unwrap();
    assert_eq!(report.rows, 2);
    assert!(!report.has_errors(), "{:?}", report.issues);
    // Published long after the work: fine, no warning
    assert_eq!(report.warning_count(), 0);
}

#[test]
fn only_errors_fail_the_run() {
    let (_dir, config) = setup(
        &[
            // warning only: cluster disagrees with workDate
            "a,000000000001,A,,a,2025-09-02,2025-09-03,insight,summer-sprint,,",
            // error: image missing
            "b,000000000002,B,,b,2025-07-01,2025-07-02,building,summer-sprint,,",
        ],
        &["a.png"],
    );
    let report = validate(&config).unwrap();
    assert!(report.has_errors());
    assert_eq!(report.rows_with_errors(), 1);

    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row, Some(2));
    assert_eq!(errors[0].field, "imageSlug");

    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert_eq!(warnings[0].field, "cluster");
}

#[test]
fn malformed_rows_are_file_errors() {
    let (_dir, config) = setup(
        &[
            "a,000000000001,A,,a,2025-07-01,2025-07-02,building,summer-sprint,,",
            "broken,row",
        ],
        &["a.png"],
    );
    let report = validate(&config).unwrap();
    assert!(report.has_errors());
    assert_eq!(report.rows, 1);
    assert_eq!(report.errors().next().map(|i| i.field), Some("file"));
}

#[test]
fn missing_episode_table_is_fatal() {
    let (dir, mut config) = setup(&[], &[]);
    config.episodes_path = dir.path().join("nope.json");
    assert!(validate(&config).is_err());
}

#[test]
fn row_numbers_follow_the_file_after_malformed_rows() {
    let (_dir, config) = setup(
        &[
            "a,000000000001,A,,a,2025-07-01,2025-07-02,building,summer-sprint,,",
            "broken,row",
            // error: image missing
            "b,000000000002,B,,b,2025-07-01,2025-07-02,building,summer-sprint,,",
        ],
        &["a.png"],
    );
    let report = validate(&config).unwrap();
    let image_error = report
        .errors()
        .find(|i| i.field == "imageSlug")
        .unwrap();
    assert_eq!(image_error.row, Some(3));
}
