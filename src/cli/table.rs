//! Table formatting utilities for CLI list commands
//!
//! Every list command builds [`TableRow`]s and hands them to a
//! [`TableFormatter`], which knows how to print them as an aligned table,
//! CSV, Markdown, or bare ids. JSON output bypasses the table and serializes
//! the entities directly.

use chrono::{DateTime, Local, NaiveDate, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Plain text, truncated to the column width
    Text(String),
    /// Reference-table name with color coding (e.g. "CLOSED", "BLOCKED")
    Status(String),
    /// Optional calendar date
    Date(Option<NaiveDate>),
    /// Optional timestamp, displayed in local time
    DateTime(Option<DateTime<Utc>>),
    /// Numeric value
    Number(i64),
    /// Yes/no flag (yes highlighted)
    Flag(bool),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Text cell from an optional value, empty when absent
    pub fn optional(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
            _ => CellValue::Empty,
        }
    }

    /// Format for aligned output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Status(name) => {
                let styled = match name.as_str() {
                    "CLOSED" | "INSTALLED" => style(name).dim(),
                    "BLOCKED" => style(name).red().bold(),
                    "IN_PROGRESS" | "E2E" => style(name).yellow(),
                    "VACATION" => style(name).magenta(),
                    "ACTIVE" | "OPEN" | "APPROVED" => style(name).green(),
                    _ => style(name).white(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Flag(flag) => {
                let styled = if *flag {
                    style("yes").yellow().bold()
                } else {
                    style("no").dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Empty => format!("{:<width$}", style("-").dim(), width = width),
            _ => format!("{:<width$}", self.raw(), width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        escape_csv(&self.raw())
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) | CellValue::Status(s) => s.clone(),
            CellValue::Date(date) => date.map(|d| d.to_string()).unwrap_or_default(),
            CellValue::DateTime(dt) => dt
                .map(|dt| {
                    let local: DateTime<Local> = dt.with_timezone(&Local);
                    local.format("%Y-%m-%d %H:%M").to_string()
                })
                .unwrap_or_default(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Flag(flag) => (if *flag { "yes" } else { "no" }).to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            CellValue::Flag(_) => 3,
            CellValue::Date(_) => 10,
            CellValue::DateTime(_) => 16,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with key, header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Hide the "N found" line (for `--quiet`)
    pub fn with_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => self.output_md(rows),
            OutputFormat::Id => self.output_ids(rows),
            _ => self.output_tsv(rows),
        }
    }

    /// Column widths sized to content, capped at each column's maximum
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let id_width = rows
            .iter()
            .map(|r| r.id.to_string().len())
            .max()
            .unwrap_or(2)
            .max(2);

        let mut widths = vec![id_width];
        for col in self.columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);
            // +2 leaves room for the truncation marker
            let natural = col.header.len().max(max_content.saturating_add(2));
            widths.push(natural.min(col.width));
        }
        widths
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let mut header_parts = vec![format!("{:>width$}", style("ID").bold().dim(), width = widths[0])];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        println!("{}", header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let mut parts = vec![format!("{:>width$}", style(row.id).cyan(), width = widths[0])];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => parts.push(value.format_tsv(*width)),
                    None => parts.push(CellValue::Empty.format_tsv(*width)),
                }
            }
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let mut headers = vec!["id".to_string()];
        headers.extend(self.columns.iter().map(|c| c.key.to_string()));
        println!("{}", headers.join(","));

        for row in rows {
            let mut values = vec![row.id.to_string()];
            for col in self.columns {
                values.push(row.get(col.key).map(|v| v.format_csv()).unwrap_or_default());
            }
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut headers = vec!["ID".to_string()];
        headers.extend(self.columns.iter().map(|c| c.header.to_string()));
        println!("| {} |", headers.join(" | "));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let mut values = vec![row.id.to_string()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("| {} |", values.join(" | "));
        }
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_text_format() {
        let cell = CellValue::Text("Hello World".to_string());
        assert!(cell.format_tsv(20).contains("Hello World"));
        assert_eq!(cell.format_csv(), "Hello World");
        assert_eq!(cell.format_md(), "Hello World");
    }

    #[test]
    fn test_cell_value_optional() {
        assert_eq!(CellValue::optional(Some("PR1")).raw(), "PR1");
        assert!(matches!(CellValue::optional(Some("")), CellValue::Empty));
        assert!(matches!(CellValue::optional(None), CellValue::Empty));
        assert_eq!(CellValue::Empty.format_csv(), "");
        assert_eq!(CellValue::Empty.format_md(), "-");
    }

    #[test]
    fn test_cell_value_dates() {
        let date = CellValue::Date(NaiveDate::from_ymd_opt(2024, 6, 15));
        assert_eq!(date.format_csv(), "2024-06-15");
        assert_eq!(CellValue::Date(None).format_csv(), "");
        assert_eq!(CellValue::DateTime(None).raw(), "");
    }

    #[test]
    fn test_cell_value_csv_escapes() {
        let cell = CellValue::Text("Design, review".to_string());
        assert_eq!(cell.format_csv(), "\"Design, review\"");
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        let cell = CellValue::Text("a|b|c".to_string());
        assert_eq!(cell.format_md(), "a\\|b\\|c");
    }

    #[test]
    fn test_cell_value_flag() {
        assert_eq!(CellValue::Flag(true).format_csv(), "yes");
        assert_eq!(CellValue::Flag(false).format_md(), "no");
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new(12)
            .cell("title", CellValue::Text("Checkout".to_string()))
            .cell("status", CellValue::Status("OPEN".to_string()));

        assert_eq!(row.id, 12);
        assert!(row.get("title").is_some());
        assert!(row.get("status").is_some());
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_widths_are_capped() {
        const COLUMNS: &[ColumnDef] = &[ColumnDef::new("title", "TITLE", 10)];
        let rows = vec![TableRow::new(1).cell(
            "title",
            CellValue::Text("A very long activity title".to_string()),
        )];
        let widths = TableFormatter::new(COLUMNS, "activity").calculate_widths(&rows);
        assert_eq!(widths, vec![2, 10]);
    }
}
