//! Document assembly: structured JSON text → [`OutputDocument`].

use crate::document::OutputDocument;
use crate::elements::StructuredDocument;
use crate::error::Pdf2DocxError;
use crate::pipeline::render::render_element;
use tracing::debug;

/// Validate `json_text` and render every element in order.
///
/// Validation is the only way this can fail; once the element list is
/// accepted, rendering always produces a document.
///
/// # Errors
/// - [`Pdf2DocxError::MalformedJson`]
/// - [`Pdf2DocxError::MissingElementsKey`]
pub fn assemble(json_text: &str) -> Result<OutputDocument, Pdf2DocxError> {
    let structured = StructuredDocument::parse(json_text)?;
    Ok(assemble_elements(&structured))
}

/// Render an already-validated element list.
pub fn assemble_elements(structured: &StructuredDocument) -> OutputDocument {
    let mut doc = OutputDocument::new();
    for element in &structured.elements {
        render_element(&mut doc, element);
    }
    debug!(
        "Assembled {} blocks from {} elements",
        doc.len(),
        structured.len()
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, ParagraphStyle};

    #[test]
    fn end_to_end_heading_and_table() {
        let doc = assemble(
            r#"{"document_elements":[{"type":"heading_1","content":"Title"},{"type":"table_markdown","content":"| A | B |\n|---|---|\n| 1 | 2 |"}]}"#,
        )
        .unwrap();

        assert_eq!(doc.len(), 2);
        match &doc.blocks()[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.style, ParagraphStyle::Heading1);
                assert_eq!(p.text, "Title");
            }
            other => panic!("expected heading, got {other:?}"),
        }
        match &doc.blocks()[1] {
            Block::Table(t) => {
                assert_eq!(t.num_cols(), 2);
                assert_eq!(t.rows().len(), 2);
                assert_eq!(t.header().texts(), vec!["A", "B"]);
                assert!(t.header().cells.iter().all(|c| c.bold));
                assert_eq!(t.rows()[1].texts(), vec!["1", "2"]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn missing_key_fails_validation() {
        let err = assemble(r#"{"foo": []}"#).unwrap_err();
        assert!(matches!(err, Pdf2DocxError::MissingElementsKey));
    }

    #[test]
    fn invalid_json_fails_validation() {
        let err = assemble("not json").unwrap_err();
        assert!(matches!(err, Pdf2DocxError::MalformedJson { .. }));
    }

    #[test]
    fn empty_list_gives_empty_document() {
        let doc = assemble(r#"{"document_elements": []}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let doc = assemble(
            r#"{"document_elements":[
                {"type":"paragraph","content":"first"},
                {"type":"heading_2","content":"second"},
                {"type":"paragraph","content":""},
                {"type":"sidebar","content":"third"}
            ]}"#,
        )
        .unwrap();
        let texts: Vec<&str> = doc.paragraphs().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "[Unknown type: sidebar] third"]);
    }
}
