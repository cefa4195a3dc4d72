//! Element rendering: one [`DocumentElement`] → zero or more output blocks.
//!
//! Rendering never fails. Anything the renderer cannot represent faithfully
//! degrades to a visible Normal paragraph so content is never silently lost
//! and one bad element cannot sink a whole document.

use crate::document::{OutputDocument, Paragraph, ParagraphStyle, Table};
use crate::elements::DocumentElement;
use crate::error::Pdf2DocxError;
use crate::pipeline::docx::is_xml_char;
use crate::pipeline::table::{parse_table, TableGrid};
use tracing::{debug, warn};

/// Prefix of the paragraph emitted when a table cannot be built.
pub const TABLE_FALLBACK_MARKER: &str = "[Fallback: Error rendering table. Raw Markdown:]";

/// Append the blocks for `element` to `doc`.
pub fn render_element(doc: &mut OutputDocument, element: &DocumentElement) {
    match element {
        DocumentElement::Heading1(text) => {
            doc.push_paragraph(Paragraph::new(ParagraphStyle::Heading1, text.as_str()))
        }
        DocumentElement::Heading2(text) => {
            doc.push_paragraph(Paragraph::new(ParagraphStyle::Heading2, text.as_str()))
        }
        DocumentElement::Heading3(text) => {
            doc.push_paragraph(Paragraph::new(ParagraphStyle::Heading3, text.as_str()))
        }
        DocumentElement::Paragraph(text) => {
            let collapsed = collapse_line_breaks(text);
            if !collapsed.is_empty() {
                doc.push_paragraph(Paragraph::normal(collapsed));
            }
        }
        DocumentElement::TableMarkdown(raw) => render_table(doc, raw),
        DocumentElement::Unknown { kind, content } => {
            if !content.is_empty() {
                debug!("Rendering element of unknown type '{}' as text", kind);
                doc.push_paragraph(Paragraph::normal(format!(
                    "[Unknown type: {kind}] {content}"
                )));
            }
        }
    }
}

/// Parse and append a Markdown table, falling back to raw text on failure.
fn render_table(doc: &mut OutputDocument, raw: &str) {
    if raw.trim().is_empty() {
        return;
    }

    let grid = parse_table(raw);
    if grid.num_cols() == 0 {
        debug!("Table content produced no rows; skipping");
        return;
    }

    match build_table(&grid) {
        Ok(table) => doc.push_table(table),
        Err(e) => {
            warn!("{}; keeping raw Markdown", e);
            doc.push_paragraph(Paragraph::normal(format!("{TABLE_FALLBACK_MARKER}\n{raw}")));
        }
    }
}

/// Materialise a grid as a table: bold header, then every data row whose
/// width matches the header. Mismatched rows are dropped.
///
/// # Errors
/// [`Pdf2DocxError::TableRenderFailure`] if the grid has no header columns
/// or a cell holds characters that cannot be stored in a DOCX text node.
pub fn build_table(grid: &TableGrid) -> Result<Table, Pdf2DocxError> {
    let header = grid
        .header()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Pdf2DocxError::TableRenderFailure {
            detail: "table has no header columns".to_string(),
        })?;

    for (r, row) in grid.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(bad) = cell.chars().find(|&ch| !is_xml_char(ch)) {
                return Err(Pdf2DocxError::TableRenderFailure {
                    detail: format!(
                        "cell ({}, {}) contains control character U+{:04X}",
                        r + 1,
                        c + 1,
                        bad as u32
                    ),
                });
            }
        }
    }

    let mut table = Table::with_header(header);
    for row in grid.body() {
        if !table.push_row(row) {
            debug!(
                "Dropping table row with {} cells (expected {})",
                row.len(),
                table.num_cols()
            );
        }
    }
    Ok(table)
}

/// Replace every line boundary with one space and trim the result.
///
/// `\r\n` counts as a single boundary. Vertical tab, form feed, the
/// C1/Unicode separators (`\u{1C}`–`\u{1E}`, `\u{85}`, `\u{2028}`,
/// `\u{2029}`) and lone `\r` are boundaries too.
pub fn collapse_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' | '\u{B}' | '\u{C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => out.push(' '),
            other => out.push(other),
        }
    }
    // A trailing boundary terminates the last line rather than adding one.
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;

    fn render_all(elements: &[DocumentElement]) -> OutputDocument {
        let mut doc = OutputDocument::new();
        for el in elements {
            render_element(&mut doc, el);
        }
        doc
    }

    fn only_paragraph(doc: &OutputDocument) -> &Paragraph {
        assert_eq!(doc.len(), 1, "expected exactly one block: {doc:?}");
        match &doc.blocks()[0] {
            Block::Paragraph(p) => p,
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn headings_map_to_styles_verbatim() {
        let doc = render_all(&[
            DocumentElement::Heading1("  One ".into()),
            DocumentElement::Heading2("Two".into()),
            DocumentElement::Heading3("Three".into()),
        ]);
        let styles: Vec<_> = doc.paragraphs().map(|p| p.style).collect();
        assert_eq!(
            styles,
            vec![
                ParagraphStyle::Heading1,
                ParagraphStyle::Heading2,
                ParagraphStyle::Heading3
            ]
        );
        assert_eq!(doc.paragraphs().next().unwrap().text, "  One ");
    }

    #[test]
    fn paragraph_line_breaks_collapse() {
        let doc = render_all(&[DocumentElement::Paragraph("line one\nline two".into())]);
        let p = only_paragraph(&doc);
        assert_eq!(p.style, ParagraphStyle::Normal);
        assert_eq!(p.text, "line one line two");
    }

    #[test]
    fn blank_paragraph_dropped() {
        let doc = render_all(&[
            DocumentElement::Paragraph(String::new()),
            DocumentElement::Paragraph(" \n \r\n ".into()),
        ]);
        assert!(doc.is_empty());
    }

    #[test]
    fn collapse_handles_crlf_and_separators() {
        assert_eq!(collapse_line_breaks("a\r\nb\rc\u{2028}d"), "a b c d");
        assert_eq!(collapse_line_breaks("a\n\nb"), "a  b");
        assert_eq!(collapse_line_breaks("\n  text \n"), "text");
    }

    #[test]
    fn empty_table_content_contributes_nothing() {
        let doc = render_all(&[
            DocumentElement::TableMarkdown(String::new()),
            DocumentElement::TableMarkdown("   \n ".into()),
        ]);
        assert!(doc.is_empty());
    }

    #[test]
    fn table_without_pipe_rows_contributes_nothing() {
        let doc = render_all(&[DocumentElement::TableMarkdown("no table here".into())]);
        assert!(doc.is_empty());
    }

    #[test]
    fn table_rendered_with_bold_header() {
        let doc = render_all(&[DocumentElement::TableMarkdown(
            "| A | B |\n|---|---|\n| 1 | 2 |".into(),
        )]);
        let table = doc.tables().next().expect("table block");
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.header().texts(), vec!["A", "B"]);
        assert!(table.header().cells.iter().all(|c| c.bold));
        assert_eq!(table.rows()[1].texts(), vec!["1", "2"]);
        assert!(table.rows()[1].cells.iter().all(|c| !c.bold));
    }

    #[test]
    fn control_character_in_cell_falls_back_to_raw_text() {
        let raw = "| A | B |\n|---|---|\n| 1 | \u{7}bell |";
        let doc = render_all(&[DocumentElement::TableMarkdown(raw.into())]);
        let p = only_paragraph(&doc);
        assert!(p.text.starts_with(TABLE_FALLBACK_MARKER));
        assert!(p.text.ends_with(raw));
        assert_eq!(doc.tables().count(), 0);
    }

    #[test]
    fn build_table_rejects_empty_grid() {
        let err = build_table(&TableGrid::default()).unwrap_err();
        assert!(matches!(err, Pdf2DocxError::TableRenderFailure { .. }));
    }

    #[test]
    fn build_table_drops_mismatched_rows() {
        let grid = TableGrid {
            rows: vec![
                vec!["A".into(), "B".into()],
                vec!["1".into()],
                vec!["2".into(), "3".into()],
            ],
        };
        let table = build_table(&grid).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1].texts(), vec!["2", "3"]);
    }

    #[test]
    fn unknown_type_is_visible() {
        let doc = render_all(&[DocumentElement::from_parts("footnote", "x")]);
        let p = only_paragraph(&doc);
        assert!(p.text.contains("footnote"));
        assert!(p.text.contains('x'));
        assert_eq!(p.text, "[Unknown type: footnote] x");
    }

    #[test]
    fn unknown_type_without_content_dropped() {
        let doc = render_all(&[DocumentElement::from_parts("figure", "")]);
        assert!(doc.is_empty());
    }
}
