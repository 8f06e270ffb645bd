//! Minimal CSV codec for the metadata file
//!
//! Quoting follows RFC 4180: fields containing a comma, a double quote or a
//! line break are wrapped in quotes and embedded quotes are doubled.

use std::borrow::Cow;

/// Parse one logical CSV record into its fields.
///
/// The record may span several physical lines when a quoted field contains
/// newlines (see [`split_records`]). An unterminated quote runs to the end
/// of the input.
pub fn parse_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }
    fields.push(field);
    fields
}

/// Quote a single field if needed.
pub fn format_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Serialize fields into one CSV record (no trailing newline).
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format_field(field.as_ref()));
    }
    out
}

/// Split file contents into logical records.
///
/// Line breaks inside quoted fields stay part of the record. Both LF and
/// CRLF terminate a record; blank records and a leading BOM are dropped.
pub fn split_records(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => {
                // Doubled quotes toggle twice, which leaves the state unchanged
                in_quotes = !in_quotes;
                current.push(c);
            }
            '\n' if !in_quotes => {
                push_record(&mut records, &mut current);
            }
            _ => current.push(c),
        }
    }
    push_record(&mut records, &mut current);
    records
}

fn push_record(records: &mut Vec<String>, current: &mut String) {
    if current.ends_with('\r') {
        current.pop();
    }
    if !current.trim().is_empty() {
        records.push(std::mem::take(current));
    } else {
        current.clear();
    }
}
