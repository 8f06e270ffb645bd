//! Blog post metadata record (one row of `blog-metadata.csv`)

use std::fmt;
use std::str::FromStr;

/// Canonical column order used when writing a fresh file.
pub const COLUMNS: [&str; 11] = [
    "slug",
    "hashId",
    "title",
    "chatDate",
    "imageSlug",
    "workDate",
    "pubDate",
    "category",
    "cluster",
    "featured",
    "notes",
];

/// Post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Building,
    Insight,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Insight => "insight",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "building" => Ok(Self::Building),
            "insight" => Ok(Self::Insight),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// One row of the metadata table.
///
/// All fields are kept as raw strings so a malformed value survives a
/// read/write cycle untouched; typed views live on the accessor methods.
/// Columns outside [`COLUMNS`] are carried in `extra` in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogPostRecord {
    pub slug: String,
    pub hash_id: String,
    pub title: String,
    pub chat_date: String,
    pub image_slug: String,
    pub work_date: String,
    pub pub_date: String,
    pub category: String,
    pub cluster: String,
    pub featured: String,
    pub notes: String,
    pub extra: Vec<(String, String)>,
}

impl BlogPostRecord {
    /// Field value by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = match column {
            "slug" => &self.slug,
            "hashId" => &self.hash_id,
            "title" => &self.title,
            "chatDate" => &self.chat_date,
            "imageSlug" => &self.image_slug,
            "workDate" => &self.work_date,
            "pubDate" => &self.pub_date,
            "category" => &self.category,
            "cluster" => &self.cluster,
            "featured" => &self.featured,
            "notes" => &self.notes,
            other => {
                return self
                    .extra
                    .iter()
                    .find(|(k, _)| k == other)
                    .map(|(_, v)| v.as_str());
            }
        };
        Some(value)
    }

    /// Set a field by column name. Unknown columns go to `extra`.
    pub fn set(&mut self, column: &str, value: String) {
        let slot = match column {
            "slug" => &mut self.slug,
            "hashId" => &mut self.hash_id,
            "title" => &mut self.title,
            "chatDate" => &mut self.chat_date,
            "imageSlug" => &mut self.image_slug,
            "workDate" => &mut self.work_date,
            "pubDate" => &mut self.pub_date,
            "category" => &mut self.category,
            "cluster" => &mut self.cluster,
            "featured" => &mut self.featured,
            "notes" => &mut self.notes,
            other => {
                if let Some(entry) = self.extra.iter_mut().find(|(k, _)| k == other) {
                    entry.1 = value;
                } else {
                    self.extra.push((other.to_string(), value));
                }
                return;
            }
        };
        *slot = value;
    }

    pub fn category(&self) -> Option<Category> {
        self.category.parse().ok()
    }

    /// Short label for log lines.
    pub fn label(&self) -> &str {
        if !self.slug.is_empty() {
            &self.slug
        } else if !self.hash_id.is_empty() {
            &self.hash_id
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse() {
        assert_eq!("building".parse::<Category>(), Ok(Category::Building));
        assert_eq!(" insight ".parse::<Category>(), Ok(Category::Insight));
        assert!("Building".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn get_set_known_columns() {
        let mut r = BlogPostRecord::default();
        r.set("hashId", "cb4864b0cfc6".into());
        r.set("workDate", "2025-10-04".into());
        assert_eq!(r.hash_id, "cb4864b0cfc6");
        assert_eq!(r.get("workDate"), Some("2025-10-04"));
    }

    #[test]
    fn unknown_columns_go_to_extra() {
        let mut r = BlogPostRecord::default();
        r.set("readingTime", "5".into());
        r.set("readingTime", "6".into());
        assert_eq!(r.extra, vec![("readingTime".to_string(), "6".to_string())]);
        assert_eq!(r.get("readingTime"), Some("6"));
        assert_eq!(r.get("missing"), None);
    }

    #[test]
    fn label_prefers_slug() {
        let mut r = BlogPostRecord {
            title: "T".into(),
            ..Default::default()
        };
        assert_eq!(r.label(), "T");
        r.hash_id = "abc".into();
        assert_eq!(r.label(), "abc");
        r.slug = "s".into();
        assert_eq!(r.label(), "s");
    }
}
