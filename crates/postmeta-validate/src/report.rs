//! Validation issues and their rendering

use std::fmt;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Color, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Blocks deploy.
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// One finding. `row` is the 1-based data row, `None` for file-level issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub row: Option<usize>,
    pub label: String,
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(
                f,
                "{} row {row} ({}): {}: {}",
                self.severity, self.label, self.field, self.message
            ),
            None => write!(f, "{}: {}: {}", self.severity, self.field, self.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub rows: usize,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub(crate) fn push(
        &mut self,
        severity: Severity,
        row: Option<usize>,
        label: &str,
        field: &'static str,
        message: impl Into<String>,
    ) {
        self.issues.push(Issue {
            severity,
            row,
            label: label.to_string(),
            field,
            message: message.into(),
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Any error at all; the process exits 1 when true.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Distinct rows with at least one error.
    pub fn rows_with_errors(&self) -> usize {
        let mut rows: Vec<usize> = self.errors().filter_map(|i| i.row).collect();
        rows.sort_unstable();
        rows.dedup();
        rows.len()
    }

    /// Issue counts per field as a table string.
    pub fn format_summary(&self) -> String {
        let mut fields: Vec<&'static str> = self.issues.iter().map(|i| i.field).collect();
        fields.sort_unstable();
        fields.dedup();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Field").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new("Errors").fg(Color::Cyan),
                Cell::new("Warnings").fg(Color::Cyan),
            ]);

        for field in fields {
            let count = |s: Severity| {
                self.issues
                    .iter()
                    .filter(|i| i.field == field && i.severity == s)
                    .count()
            };
            let errors = count(Severity::Error);
            let warnings = count(Severity::Warning);
            table.add_row(vec![
                Cell::new(field),
                count_cell(errors, Color::Red),
                count_cell(warnings, Color::Yellow),
            ]);
        }

        let status = if self.has_errors() {
            Cell::new("FAIL").fg(Color::Red).add_attribute(Attribute::Bold)
        } else {
            Cell::new("OK").fg(Color::Green).add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            Cell::new(format!("{} rows", self.rows)),
            Cell::new(self.error_count()),
            Cell::new(self.warning_count()),
        ]);
        table.add_row(vec![status, Cell::new(""), Cell::new("")]);

        format!("\n{table}")
    }

    /// Issue list as a table string; warnings only when `verbose`.
    pub fn format_issues(&self, verbose: bool) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Row").fg(Color::Cyan),
                Cell::new("Post").fg(Color::Cyan),
                Cell::new("Field").fg(Color::Cyan),
                Cell::new("Issue").fg(Color::Cyan),
            ]);

        for issue in self
            .issues
            .iter()
            .filter(|i| verbose || i.severity == Severity::Error)
        {
            let color = match issue.severity {
                Severity::Error => Color::Red,
                Severity::Warning => Color::Yellow,
            };
            table.add_row(vec![
                Cell::new(issue.row.map_or_else(|| "-".to_string(), |r| r.to_string())),
                Cell::new(&issue.label),
                Cell::new(issue.field),
                Cell::new(&issue.message).fg(color),
            ]);
        }

        format!("\n{table}")
    }
}

fn count_cell(n: usize, color: Color) -> Cell {
    if n == 0 {
        Cell::new("-")
    } else {
        Cell::new(n).fg(color)
    }
}
