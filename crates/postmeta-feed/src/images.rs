//! Download missing post images from the first `<img>` of each post's HTML

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use postmeta_core::{BlogPostRecord, ContentStore, ImageIndex, IMAGE_EXTENSIONS};
use regex::Regex;

use crate::http::fetch;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImageSummary {
    pub downloaded: usize,
    /// Already on disk.
    pub present: usize,
    /// No content or no `<img>` in it.
    pub no_source: usize,
    pub failed: usize,
}

/// `src` of the first `<img>` tag.
pub fn first_image_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .map(|c| c[1].replace("&amp;", "&"))
}

/// File extension for a downloaded image.
///
/// The declared content type wins; then the URL's extension; `jpg` otherwise.
pub fn image_extension(url: &str, content_type: Option<&str>) -> &'static str {
    let from_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .and_then(|ct| match ct.as_str() {
            "image/png" => Some("png"),
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/webp" => Some("webp"),
            "image/gif" => Some("gif"),
            _ => None,
        });
    if let Some(ext) = from_type {
        return ext;
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let from_url = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .and_then(|ext| IMAGE_EXTENSIONS.iter().find(|known| **known == ext).copied());
    match from_url {
        Some("jpeg") => "jpg",
        Some(ext) => ext,
        None => "jpg",
    }
}

/// Fetch images for records whose `imageSlug` has no file in `dir`.
///
/// Requests run one at a time with `delay` between them. Failures are
/// logged and counted, never fatal.
pub fn download_images(
    records: &[BlogPostRecord],
    contents: &ContentStore,
    dir: &Path,
    delay: Duration,
    pb: &ProgressBar,
) -> Result<ImageSummary> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let index = ImageIndex::load(dir)?;
    let mut summary = ImageSummary::default();

    let mut first_request = true;
    for record in records {
        pb.inc(1);
        let image_slug = record.image_slug.trim();
        if image_slug.is_empty() {
            log::debug!("{}: no imageSlug", record.label());
            continue;
        }
        if index.find(image_slug).is_some() {
            summary.present += 1;
            continue;
        }

        let Some(src) = contents.get(&record.hash_id).and_then(|c| first_image_src(&c.content))
        else {
            log::debug!("{}: no image source in content", record.label());
            summary.no_source += 1;
            continue;
        };

        if !first_request {
            std::thread::sleep(delay);
        }
        first_request = false;
        pb.set_message(image_slug.to_string());

        match fetch(&src, &[]) {
            Ok(fetched) => {
                let ext = image_extension(&fetched.final_url, fetched.content_type.as_deref());
                let target = dir.join(format!("{image_slug}.{ext}"));
                std::fs::write(&target, &fetched.bytes)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                log::info!("{}: saved {}", record.label(), target.display());
                summary.downloaded += 1;
            }
            Err(e) => {
                log::warn!("{}: failed to download {src}: {e}", record.label());
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postmeta_core::BlogContent;

    #[test]
    fn first_img() {
        let html = r#"<h3>T</h3><figure><img alt="x" src="https://cdn/a.png?w=1&amp;h=2" /></figure><img src='b.jpg'>"#;
        assert_eq!(
            first_image_src(html).as_deref(),
            Some("https://cdn/a.png?w=1&h=2")
        );
        assert_eq!(first_image_src("<p>no images</p>"), None);
        assert_eq!(first_image_src(r#"<IMG SRC="c.gif">"#).as_deref(), Some("c.gif"));
    }

    #[test]
    fn extension_choice() {
        assert_eq!(image_extension("https://x/a.png", Some("image/webp")), "webp");
        assert_eq!(image_extension("https://x/a.png", Some("image/jpeg; q=1")), "jpg");
        assert_eq!(image_extension("https://x/a.PNG?x=1", None), "png");
        assert_eq!(image_extension("https://x/a.jpeg", Some("application/octet-stream")), "jpg");
        assert_eq!(image_extension("https://x/1*abc", None), "jpg");
    }

    #[test]
    fn present_and_sourceless_skip_network() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("have-it.webp"), b"x").unwrap();

        let records = vec![
            BlogPostRecord {
                hash_id: "000000000001".into(),
                image_slug: "have-it".into(),
                ..Default::default()
            },
            BlogPostRecord {
                hash_id: "000000000002".into(),
                image_slug: "no-content".into(),
                ..Default::default()
            },
            BlogPostRecord {
                hash_id: "000000000003".into(),
                image_slug: "no-img".into(),
                ..Default::default()
            },
        ];
        let mut contents = ContentStore::default();
        contents.upsert(
            "000000000003".into(),
            BlogContent {
                content: "<p>text only</p>".into(),
                ..Default::default()
            },
        );

        let summary = download_images(
            &records,
            &contents,
            dir.path(),
            Duration::ZERO,
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(
            summary,
            ImageSummary {
                downloaded: 0,
                present: 1,
                no_source: 2,
                failed: 0,
            }
        );
    }
}
