//! Table formatting utilities for CLI list commands
//!
//! Every list command (findings, options, suitable PSUs, estimates,
//! rules) goes through [`TableFormatter`], so the TSV/CSV/Markdown/id
//! renderings stay consistent.
//!
//! # Text Wrapping
//!
//! - Use `TableConfig::with_wrap(width)` to enable word-wrapped multi-line rows
//! - CSV and id formats remain single-line for pipability

use console::style;

use crate::cli::helpers::{escape_csv, format_watts, truncate_str};
use crate::cli::OutputFormat;
use crate::core::rules::Severity;
use crate::entities::part::Category;

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Maximum width for text columns before wrapping (None = truncate instead)
    pub wrap_width: Option<usize>,
    /// Show summary line after table (e.g., "5 part(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wrap_width: None,
            show_summary: true,
        }
    }
}

impl TableConfig {
    /// Create config with text wrapping enabled at the specified width
    pub fn with_wrap(width: usize) -> Self {
        Self {
            wrap_width: Some(width),
            show_summary: true,
        }
    }

    /// Create config optimized for piping (no wrapping, no summary)
    pub fn for_pipe() -> Self {
        Self {
            wrap_width: None,
            show_summary: false,
        }
    }
}

/// Wrap text to fit within a maximum width, breaking at word boundaries
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if text.chars().count() <= max_width || max_width < 5 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current_line.chars().count();

        if !current_line.is_empty() && current_len + 1 + word_len <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
            continue;
        }

        if !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
        }

        // Words longer than the width are force-broken
        let chars: Vec<char> = word.chars().collect();
        let mut chunks = chars.chunks(max_width).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current_line = piece;
            }
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Plain text, optionally truncated
    Text(String),
    /// Part category
    Category(Category),
    /// List of categories, comma-separated
    Categories(Vec<Category>),
    /// Filter verdict with color coding (ok=green, conflict=red)
    Verdict(String),
    /// Finding severity with color coding
    Severity(Severity),
    /// Wattage
    Watts(f64),
    /// Numeric value
    Number(i64),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Category(c) => {
                format!("{:<width$}", style(c.as_str()).cyan(), width = width)
            }
            CellValue::Categories(_) => {
                format!(
                    "{:<width$}",
                    truncate_str(&self.raw(), width.saturating_sub(2)),
                    width = width
                )
            }
            CellValue::Verdict(v) => {
                let styled = match v.as_str() {
                    "ok" => style(v).green(),
                    "conflict" => style(v).red().bold(),
                    _ => style(v).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Severity(severity) => {
                let s = severity.to_string();
                let styled = match severity {
                    Severity::Blocking => style(s).red().bold(),
                    Severity::Info => style(s).yellow(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Watts(_) => format!("{:>width$}", self.raw(), width = width),
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Watts(w) => crate::core::normalize::format_number(*w),
            CellValue::Empty => String::new(),
            _ => escape_csv(&self.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Severity(Severity::Blocking) => "**blocking**".to_string(),
            CellValue::Empty => "-".to_string(),
            _ => self.raw(),
        };
        // Escape pipe characters for markdown tables
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Category(c) => c.to_string(),
            CellValue::Categories(list) => list
                .iter()
                .map(Category::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            CellValue::Verdict(v) => v.clone(),
            CellValue::Severity(s) => s.to_string(),
            CellValue::Watts(w) => format_watts(*w),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            _ => self.raw().chars().count(),
        }
    }

    fn wraps(&self) -> bool {
        matches!(self, CellValue::Text(_) | CellValue::Categories(_))
    }
}

/// Column definition with header label and width
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
    /// Printed alone by the id format (model name or rule id)
    pub key: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
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
    item_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], item_name: &'static str) -> Self {
        Self {
            columns,
            item_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in the specified format
    ///
    /// JSON and YAML are handled by the caller with the full data; they
    /// fall back to TSV here.
    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            OutputFormat::Id => self.output_ids(&rows),
            _ => self.output_tsv(&rows),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);

                // +2 for the truncation buffer; never wider than the column allows
                let natural_width = col.header.len().max(max_content.saturating_add(2));
                natural_width.min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header_parts: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, width)| format!("{:<width$}", style(col.header).bold(), width = width))
            .collect();
        println!("{}", header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            match self.config.wrap_width {
                Some(wrap_width) => self.output_tsv_row_wrapped(row, &widths, wrap_width),
                None => self.output_tsv_row_truncated(row, &widths),
            }
        }

        if self.config.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.item_name);
        }
    }

    fn output_tsv_row_truncated(&self, row: &TableRow, widths: &[usize]) {
        let row_parts: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .map(|(col, &width)| match row.get(col.key) {
                Some(value) => value.format_tsv(width),
                None => format!("{:<width$}", "-", width = width),
            })
            .collect();
        println!("{}", row_parts.join(" "));
    }

    fn output_tsv_row_wrapped(&self, row: &TableRow, widths: &[usize], wrap_width: usize) {
        let wrapped_cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|col| match row.get(col.key) {
                Some(value) if value.wraps() => wrap_text(&value.raw(), wrap_width),
                Some(value) => vec![value.raw()],
                None => vec!["-".to_string()],
            })
            .collect();

        let max_lines = wrapped_cells.iter().map(|c| c.len()).max().unwrap_or(1);

        for line_idx in 0..max_lines {
            let row_parts: Vec<String> = wrapped_cells
                .iter()
                .enumerate()
                .map(|(col_idx, cell_lines)| {
                    let width = widths.get(col_idx).copied().unwrap_or(10);
                    let content = cell_lines.get(line_idx).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", content, width = width)
                })
                .collect();
            println!("{}", row_parts.join(" ").trim_end());
        }

        // Blank line between multi-line rows for readability
        if max_lines > 1 {
            println!();
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|col| col.key).collect();
        println!("{}", headers.join(","));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(CellValue::format_csv).unwrap_or_default())
                .collect();
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|col| col.header).collect();
        println!("| {} |", headers.join(" | "));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            println!("| {} |", values.join(" | "));
        }
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.key);
        }
    }
}
