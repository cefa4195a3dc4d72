//! Markdown table parsing: pipe-delimited text → rectangular cell grid.
//!
//! Model-generated tables are frequently ragged: a row loses a trailing
//! cell, gains a stray one, or the table is surrounded by prose. The parser
//! never rejects input. Non-table lines are ignored and every accepted row
//! is padded or truncated to the header's width, so downstream code can
//! rely on a rectangular grid.

use serde::Serialize;

/// Parsed table cells. Row 0 is the header; all rows share its width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableGrid {
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of the header row (0 for an empty grid).
    pub fn num_cols(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Data rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Re-serialise as a GFM pipe table with a separator row.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            out.push_str(&format_row(row));
            out.push('\n');
            if i == 0 {
                let sep: Vec<String> = row.iter().map(|_| "---".to_string()).collect();
                out.push_str(&format_row(&sep));
                out.push('\n');
            }
        }
        out
    }
}

fn format_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Parse a Markdown pipe table into a [`TableGrid`].
///
/// Lines are trimmed and blank lines dropped. A separator row (only `-`,
/// `|`, `:` and spaces) is skipped when it is the second line. Lines that
/// do not both start and end with `|` are ignored. The first accepted row
/// fixes the column count; later rows are truncated or right-padded with
/// empty cells to match.
pub fn parse_table(raw: &str) -> TableGrid {
    let lines: Vec<&str> = raw
        .trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut num_cols = 0usize;

    for (i, line) in lines.iter().enumerate() {
        if i == 1 && is_separator_row(line) {
            continue;
        }
        if !(line.starts_with('|') && line.ends_with('|')) {
            continue;
        }

        let mut cells = split_cells(line);

        if num_cols == 0 {
            if cells.is_empty() {
                continue;
            }
            num_cols = cells.len();
            rows.push(cells);
            continue;
        }

        if cells.len() > num_cols {
            cells.truncate(num_cols);
        } else if cells.len() < num_cols {
            cells.resize(num_cols, String::new());
        }
        rows.push(cells);
    }

    TableGrid { rows }
}

/// `|:--|---:|` style header/alignment separator.
fn is_separator_row(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '-' | '|' | ':' | ' '))
}

/// Strip the enclosing pipes, split on the rest, trim every cell.
fn split_cells(line: &str) -> Vec<String> {
    line.trim_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .collect()
}
