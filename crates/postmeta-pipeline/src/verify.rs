//! Post-write self-check of a metadata table

use std::collections::HashMap;

use postmeta_core::MetadataTable;

/// A problem that makes a freshly written table unacceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    DuplicateHashId { hash_id: String, count: usize },
    DuplicateSlug { slug: String, count: usize },
    RowCount { expected: usize, actual: usize },
    SkippedRows(usize),
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateHashId { hash_id, count } => {
                write!(f, "hashId {hash_id} appears {count} times")
            }
            Self::DuplicateSlug { slug, count } => write!(f, "slug {slug} appears {count} times"),
            Self::RowCount { expected, actual } => {
                write!(f, "expected {expected} rows, found {actual}")
            }
            Self::SkippedRows(n) => write!(f, "{n} rows could not be parsed back"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// Check a table read back from disk against what was meant to be written.
pub fn verify_table(table: &MetadataTable, expected_rows: usize) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    if table.skipped > 0 {
        errors.push(VerifyError::SkippedRows(table.skipped));
    }
    if table.records.len() != expected_rows {
        errors.push(VerifyError::RowCount {
            expected: expected_rows,
            actual: table.records.len(),
        });
    }

    for (hash_id, count) in duplicates(table.records.iter().map(|r| r.hash_id.as_str())) {
        errors.push(VerifyError::DuplicateHashId { hash_id, count });
    }
    for (slug, count) in duplicates(table.records.iter().map(|r| r.slug.as_str())) {
        errors.push(VerifyError::DuplicateSlug { slug, count });
    }
    errors
}

/// Non-empty values occurring more than once, in first-seen order.
fn duplicates<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for v in values.filter(|v| !v.is_empty()) {
        let c = counts.entry(v).or_insert(0);
        if *c == 0 {
            order.push(v);
        }
        *c += 1;
    }
    order
        .into_iter()
        .filter_map(|v| {
            let c = counts[v];
            (c > 1).then(|| (v.to_string(), c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use postmeta_core::BlogPostRecord;

    fn rec(slug: &str, hash_id: &str) -> BlogPostRecord {
        BlogPostRecord {
            slug: slug.into(),
            hash_id: hash_id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn clean_table_passes() {
        let table = MetadataTable::with_records(vec![
            rec("a", "000000000001"),
            rec("b", "000000000002"),
        ]);
        assert!(verify_table(&table, 2).is_empty());
    }

    #[test]
    fn duplicates_and_count_reported() {
        let table = MetadataTable::with_records(vec![
            rec("a", "000000000001"),
            rec("a", "000000000001"),
            rec("c", "000000000001"),
        ]);
        let errors = verify_table(&table, 2);
        assert_eq!(
            errors,
            vec![
                VerifyError::RowCount {
                    expected: 2,
                    actual: 3
                },
                VerifyError::DuplicateHashId {
                    hash_id: "000000000001".into(),
                    count: 3
                },
                VerifyError::DuplicateSlug {
                    slug: "a".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn blank_values_are_not_duplicates() {
        let table = MetadataTable::with_records(vec![rec("", ""), rec("", "")]);
        assert!(verify_table(&table, 2).is_empty());
    }

    #[test]
    fn display_messages() {
        let e = VerifyError::DuplicateHashId {
            hash_id: "abc".into(),
            count: 2,
        };
        assert_eq!(e.to_string(), "hashId abc appears 2 times");
    }
}
