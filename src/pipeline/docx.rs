//! DOCX serialisation: [`OutputDocument`] → OOXML package.
//!
//! The package is the minimal part set Word, LibreOffice and Pages accept:
//! content types, package and document relationships, the main document,
//! a style sheet holding the four paragraph styles plus `TableGrid`, and
//! core/app properties.

use crate::document::{Block, OutputDocument, Paragraph, Table};
use crate::error::Pdf2DocxError;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Text width of a Letter page with 1" margins, in twentieths of a point.
const TEXT_WIDTH_TWIPS: usize = 9360;

/// Serialise `doc` and write it to `path`, creating the parent directory.
///
/// Takes the document by value: it is finished once handed to persistence.
/// The write is not atomic; an interrupted write can leave a partial file.
///
/// # Errors
/// [`Pdf2DocxError::PersistenceFailure`] on any I/O or archive error.
pub fn write_docx(doc: OutputDocument, path: &Path) -> Result<(), Pdf2DocxError> {
    let fail = |source: std::io::Error| Pdf2DocxError::PersistenceFailure {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }

    let file = std::fs::File::create(path).map_err(fail)?;
    write_package(&doc, file).map_err(fail)?;
    debug!("Wrote {} blocks to {}", doc.len(), path.display());
    Ok(())
}

/// Serialise `doc` into an in-memory DOCX package.
pub fn to_docx_bytes(doc: &OutputDocument) -> Result<Vec<u8>, Pdf2DocxError> {
    let mut cursor = Cursor::new(Vec::new());
    write_package(doc, &mut cursor).map_err(|e| Pdf2DocxError::SerializeFailed {
        what: "docx package",
        detail: e.to_string(),
    })?;
    Ok(cursor.into_inner())
}

fn write_package<W: Write + Seek>(doc: &OutputDocument, writer: W) -> std::io::Result<()> {
    let mut zip = ZipWriter::new(writer);
    let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", RELS_XML.to_string()),
        ("docProps/core.xml", CORE_XML.to_string()),
        ("docProps/app.xml", APP_XML.to_string()),
        ("word/document.xml", document_xml(doc)),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("word/styles.xml", STYLES_XML.to_string()),
    ];

    for (name, body) in parts {
        zip.start_file(name, opt).map_err(std::io::Error::other)?;
        zip.write_all(body.as_bytes())?;
    }

    zip.finish().map_err(std::io::Error::other)?;
    Ok(())
}

/// Characters allowed in XML 1.0 text.
pub(crate) fn is_xml_char(ch: char) -> bool {
    matches!(ch,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Build `word/document.xml`.
pub fn document_xml(doc: &OutputDocument) -> String {
    let mut body = String::new();
    for block in doc.blocks() {
        match block {
            Block::Paragraph(p) => push_paragraph(&mut body, p),
            Block::Table(t) => push_table(&mut body, t),
        }
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    {body}
    <w:sectPr>
      <w:pgSz w:w="12240" w:h="15840"/>
      <w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>
      <w:cols w:space="720"/>
      <w:docGrid w:linePitch="360"/>
    </w:sectPr>
  </w:body>
</w:document>"#
    )
}

fn push_paragraph(out: &mut String, p: &Paragraph) {
    out.push_str("<w:p>");
    out.push_str(r#"<w:pPr><w:pStyle w:val=""#);
    out.push_str(p.style.style_id());
    out.push_str(r#""/></w:pPr>"#);
    push_run(out, &p.text, false);
    out.push_str("</w:p>");
}

fn push_table(out: &mut String, t: &Table) {
    let cols = t.num_cols().max(1);
    let col_width = TEXT_WIDTH_TWIPS / cols;

    out.push_str("<w:tbl><w:tblPr>");
    out.push_str(r#"<w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/>"#);
    out.push_str(
        r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/>"#,
    );
    out.push_str("</w:tblPr><w:tblGrid>");
    for _ in 0..cols {
        out.push_str(&format!(r#"<w:gridCol w:w="{col_width}"/>"#));
    }
    out.push_str("</w:tblGrid>");

    for row in t.rows() {
        out.push_str("<w:tr>");
        for cell in &row.cells {
            out.push_str(&format!(
                r#"<w:tc><w:tcPr><w:tcW w:w="{col_width}" w:type="dxa"/></w:tcPr><w:p>"#
            ));
            push_run(out, &cell.text, cell.bold);
            out.push_str("</w:p></w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}

/// One run for `text`; `\n` becomes `<w:br/>` and `\t` becomes `<w:tab/>`.
/// Empty text produces no run.
fn push_run(out: &mut String, text: &str, bold: bool) {
    if text.is_empty() {
        return;
    }
    out.push_str("<w:r>");
    if bold {
        out.push_str("<w:rPr><w:b/></w:rPr>");
    }
    let mut pending = String::new();
    let flush = |out: &mut String, pending: &mut String| {
        if !pending.is_empty() {
            out.push_str(r#"<w:t xml:space="preserve">"#);
            out.push_str(&xml_escape_text(pending));
            out.push_str("</w:t>");
            pending.clear();
        }
    };
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush(out, &mut pending);
                out.push_str("<w:br/>");
            }
            '\n' => {
                flush(out, &mut pending);
                out.push_str("<w:br/>");
            }
            '\t' => {
                flush(out, &mut pending);
                out.push_str("<w:tab/>");
            }
            other => pending.push(other),
        }
    }
    flush(out, &mut pending);
    out.push_str("</w:r>");
}

/// Escape markup characters and drop anything XML 1.0 cannot carry.
fn xml_escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:creator>edgequake-pdf2docx</dc:creator>
</cp:coreProperties>"#;

const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
  <Application>edgequake-pdf2docx</Application>
</Properties>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault>
      <w:rPr>
        <w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/>
        <w:sz w:val="22"/>
        <w:szCs w:val="22"/>
      </w:rPr>
    </w:rPrDefault>
    <w:pPrDefault>
      <w:pPr>
        <w:spacing w:after="160" w:line="259" w:lineRule="auto"/>
      </w:pPr>
    </w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:uiPriority w:val="9"/>
    <w:qFormat/>
    <w:pPr>
      <w:keepNext/>
      <w:keepLines/>
      <w:spacing w:before="480" w:after="0"/>
      <w:outlineLvl w:val="0"/>
    </w:pPr>
    <w:rPr>
      <w:b/>
      <w:color w:val="365F91"/>
      <w:sz w:val="28"/>
      <w:szCs w:val="28"/>
    </w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:uiPriority w:val="9"/>
    <w:qFormat/>
    <w:pPr>
      <w:keepNext/>
      <w:keepLines/>
      <w:spacing w:before="200" w:after="0"/>
      <w:outlineLvl w:val="1"/>
    </w:pPr>
    <w:rPr>
      <w:b/>
      <w:color w:val="4F81BD"/>
      <w:sz w:val="26"/>
      <w:szCs w:val="26"/>
    </w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading3">
    <w:name w:val="heading 3"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:uiPriority w:val="9"/>
    <w:qFormat/>
    <w:pPr>
      <w:keepNext/>
      <w:keepLines/>
      <w:spacing w:before="200" w:after="0"/>
      <w:outlineLvl w:val="2"/>
    </w:pPr>
    <w:rPr>
      <w:b/>
      <w:color w:val="4F81BD"/>
    </w:rPr>
  </w:style>
  <w:style w:type="table" w:default="1" w:styleId="TableNormal">
    <w:name w:val="Normal Table"/>
    <w:uiPriority w:val="99"/>
    <w:semiHidden/>
    <w:unhideWhenUsed/>
    <w:tblPr>
      <w:tblInd w:w="0" w:type="dxa"/>
      <w:tblCellMar>
        <w:top w:w="0" w:type="dxa"/>
        <w:left w:w="108" w:type="dxa"/>
        <w:bottom w:w="0" w:type="dxa"/>
        <w:right w:w="108" w:type="dxa"/>
      </w:tblCellMar>
    </w:tblPr>
  </w:style>
  <w:style w:type="table" w:styleId="TableGrid">
    <w:name w:val="Table Grid"/>
    <w:basedOn w:val="TableNormal"/>
    <w:uiPriority w:val="59"/>
    <w:pPr>
      <w:spacing w:after="0" w:line="240" w:lineRule="auto"/>
    </w:pPr>
    <w:tblPr>
      <w:tblBorders>
        <w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>
        <w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>
        <w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>
        <w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>
        <w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>
        <w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>
      </w:tblBorders>
    </w:tblPr>
  </w:style>
</w:styles>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Paragraph, ParagraphStyle, Table};
    use std::io::Read;

    fn sample() -> OutputDocument {
        let mut doc = OutputDocument::new();
        doc.push_paragraph(Paragraph::new(ParagraphStyle::Heading1, "R&D <report>"));
        let mut t = Table::with_header(&["A".to_string(), "B".to_string()]);
        t.push_row(&["1".to_string(), String::new()]);
        doc.push_table(t);
        doc.push_paragraph(Paragraph::normal("line\nbreak\tand tab"));
        doc
    }

    #[test]
    fn xml_char_ranges() {
        assert!(is_xml_char('\t') && is_xml_char('\n') && is_xml_char('é'));
        assert!(is_xml_char('\u{1F600}'));
        assert!(!is_xml_char('\u{7}'));
        assert!(!is_xml_char('\u{FFFE}'));
    }

    #[test]
    fn escapes_markup_and_drops_control_chars() {
        assert_eq!(xml_escape_text("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&apos;");
        assert_eq!(xml_escape_text("x\u{0}y\u{1B}z"), "xyz");
    }

    #[test]
    fn document_xml_structure() {
        let xml = document_xml(&sample());
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains("R&amp;D &lt;report&gt;"));
        assert!(xml.contains(r#"<w:tblStyle w:val="TableGrid"/>"#));
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:gridCol ").count(), 2);
        assert_eq!(xml.matches("<w:rPr><w:b/></w:rPr>").count(), 2);
        assert!(xml.contains("<w:br/>"));
        assert!(xml.contains("<w:tab/>"));
        // Heading precedes table precedes paragraph.
        let h = xml.find("Heading1").unwrap();
        let t = xml.find("<w:tbl>").unwrap();
        let p = xml.find("break").unwrap();
        assert!(h < t && t < p);
    }

    #[test]
    fn empty_cell_still_has_paragraph() {
        let xml = document_xml(&sample());
        assert!(xml.contains(r#"<w:tcW w:w="4680" w:type="dxa"/></w:tcPr><w:p></w:p></w:tc>"#));
    }

    #[test]
    fn package_contains_all_parts() {
        let bytes = to_docx_bytes(&sample()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {name}");
        }
        let mut styles = String::new();
        archive
            .by_name("word/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();
        for id in ["Normal", "Heading1", "Heading2", "Heading3", "TableGrid"] {
            assert!(styles.contains(&format!(r#"w:styleId="{id}""#)), "missing style {id}");
        }
    }

    #[test]
    fn write_docx_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/doc.docx");
        write_docx(sample(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_docx_reports_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        // The target path is an existing directory.
        let err = write_docx(sample(), dir.path()).unwrap_err();
        assert!(matches!(err, Pdf2DocxError::PersistenceFailure { .. }));
    }
}
