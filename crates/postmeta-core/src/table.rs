//! Header-driven reading and writing of `blog-metadata.csv`
//!
//! Column order has drifted between generations of the file, so the header
//! row decides which field lands where. Writing keeps the header that was
//! read and appends any canonical or extra column it lacked.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::csv_row::{format_row, parse_row, split_records};
use crate::record::{BlogPostRecord, COLUMNS};

/// Parsed metadata file.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    pub header: Vec<String>,
    pub records: Vec<BlogPostRecord>,
    /// Data rows dropped because their field count did not match the header.
    pub skipped: usize,
    /// 1-based data-row number in the source file of each record, counting
    /// skipped rows. Empty for tables not parsed from text.
    pub source_rows: Vec<usize>,
}

impl MetadataTable {
    /// Empty table with the canonical header.
    pub fn new() -> Self {
        Self {
            header: COLUMNS.iter().map(|c| c.to_string()).collect(),
            records: Vec::new(),
            skipped: 0,
            source_rows: Vec::new(),
        }
    }

    pub fn with_records(records: Vec<BlogPostRecord>) -> Self {
        Self {
            records,
            ..Self::new()
        }
    }

    /// Parse CSV text. An empty input yields an empty canonical table.
    pub fn parse(text: &str) -> Self {
        let mut lines = split_records(text).into_iter();
        let Some(header_line) = lines.next() else {
            return Self::new();
        };
        let header: Vec<String> = parse_row(&header_line)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        let mut source_rows = Vec::new();
        let mut skipped = 0;
        for (i, line) in lines.enumerate() {
            let fields = parse_row(&line);
            if fields.len() != header.len() {
                log::warn!(
                    "row {}: expected {} fields, found {}; skipping",
                    i + 1,
                    header.len(),
                    fields.len()
                );
                skipped += 1;
                continue;
            }
            let mut record = BlogPostRecord::default();
            for (column, value) in header.iter().zip(fields) {
                record.set(column, value);
            }
            records.push(record);
            source_rows.push(i + 1);
        }

        Self {
            header,
            records,
            skipped,
            source_rows,
        }
    }

    /// Row number to report for `records[index]`: its source row when the
    /// table was parsed, otherwise its position.
    pub fn row_number(&self, index: usize) -> usize {
        self.source_rows.get(index).copied().unwrap_or(index + 1)
    }

    /// Read a metadata file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let table = Self::parse(&text);
        log::debug!(
            "read {} records from {} ({} skipped)",
            table.records.len(),
            path.display(),
            table.skipped
        );
        Ok(table)
    }

    /// Read a metadata file, or return an empty table when it does not exist.
    pub fn read_or_empty(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::read(path)
        } else {
            log::info!("{} not found, starting from an empty table", path.display());
            Ok(Self::new())
        }
    }

    /// Columns that will be written: the read header, then missing canonical
    /// columns, then extra columns seen on records.
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns = self.header.clone();
        for c in COLUMNS {
            if !columns.iter().any(|h| h == c) {
                columns.push(c.to_string());
            }
        }
        for record in &self.records {
            for (key, _) in &record.extra {
                if !columns.iter().any(|h| h == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }

    /// Serialize to CSV text with a trailing newline.
    pub fn to_csv_string(&self) -> String {
        let columns = self.output_columns();
        let mut out = format_row(&columns);
        out.push('\n');
        for record in &self.records {
            let fields: Vec<&str> = columns
                .iter()
                .map(|c| record.get(c).unwrap_or(""))
                .collect();
            out.push_str(&format_row(&fields));
            out.push('\n');
        }
        out
    }

    /// Write to `path` via a sibling `.tmp` file and rename.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = Path::new(&tmp);
        fs::write(tmp, self.to_csv_string())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(tmp, path).with_context(|| {
            format!("failed to rename {} → {}", tmp.display(), path.display())
        })?;
        log::info!("wrote {} records to {}", self.records.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
hashId,slug,title,workDate,pubDate,category,cluster,imageSlug,chatDate,featured,notes,readingTime
cb4864b0cfc6,foo-bar,\"10/4: Foo, Bar\",2025-10-04,2025-10-05,building,ep-1,foo.png,,,,5
";

    #[test]
    fn header_decides_column_mapping() {
        let table = MetadataTable::parse(SAMPLE);
        assert_eq!(table.records.len(), 1);
        let r = &table.records[0];
        assert_eq!(r.slug, "foo-bar");
        assert_eq!(r.hash_id, "cb4864b0cfc6");
        assert_eq!(r.title, "10/4: Foo, Bar");
        assert_eq!(r.get("readingTime"), Some("5"));
    }

    #[test]
    fn short_rows_are_skipped() {
        let text = "slug,hashId,title\na,b,c\nonly,two\n";
        let table = MetadataTable::parse(text);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.skipped, 1);
    }

    #[test]
    fn row_numbers_count_skipped_rows() {
        let text = "slug,hashId,title
a,b,c
only,two
d,e,f
";
        let table = MetadataTable::parse(text);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.row_number(0), 1);
        assert_eq!(table.row_number(1), 3);

        let built = MetadataTable::with_records(table.records.clone());
        assert_eq!(built.row_number(1), 2);
    }

    #[test]
    fn empty_input_gives_canonical_header() {
        let table = MetadataTable::parse("");
        assert!(table.records.is_empty());
        assert_eq!(table.header.len(), COLUMNS.len());
    }

    #[test]
    fn write_keeps_header_order_and_extra_columns() {
        let table = MetadataTable::parse(SAMPLE);
        let out = table.to_csv_string();
        let first = out.lines().next().unwrap();
        assert!(first.starts_with("hashId,slug,title"));
        assert!(first.ends_with("readingTime"));

        let reparsed = MetadataTable::parse(&out);
        assert_eq!(reparsed.records, table.records);
    }

    #[test]
    fn missing_canonical_columns_are_appended() {
        let table = MetadataTable::parse("slug,hashId\na,cb4864b0cfc6\n");
        let columns = table.output_columns();
        assert_eq!(&columns[..2], &["slug".to_string(), "hashId".to_string()]);
        assert_eq!(columns.len(), COLUMNS.len());
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("blog-metadata.csv");
        let table = MetadataTable::parse(SAMPLE);
        table.write(&path).unwrap();
        assert!(!dir.path().join("data").join("blog-metadata.csv.tmp").exists());

        let back = MetadataTable::read(&path).unwrap();
        assert_eq!(back.records, table.records);
    }

    #[test]
    fn read_or_empty_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let table = MetadataTable::read_or_empty(&dir.path().join("nope.csv")).unwrap();
        assert!(table.records.is_empty());
    }
}
