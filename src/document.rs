//! In-memory output document: an ordered list of styled blocks.
//!
//! The renderer appends to an [`OutputDocument`]; the DOCX writer consumes
//! it. Nothing here knows about JSON or OOXML.

use serde::Serialize;

/// The four paragraph styles the output uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParagraphStyle {
    Normal,
    Heading1,
    Heading2,
    Heading3,
}

impl ParagraphStyle {
    /// OOXML `w:styleId`.
    pub fn style_id(self) -> &'static str {
        match self {
            ParagraphStyle::Normal => "Normal",
            ParagraphStyle::Heading1 => "Heading1",
            ParagraphStyle::Heading2 => "Heading2",
            ParagraphStyle::Heading3 => "Heading3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    /// Plain text; `\n` is a line break inside the paragraph.
    pub text: String,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(ParagraphStyle::Normal, text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

/// A grid-bordered table. Row 0 is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    num_cols: usize,
    rows: Vec<TableRow>,
}

impl Table {
    /// Start a table whose bold header row fixes the column count.
    pub fn with_header(header: &[String]) -> Self {
        let cells = header
            .iter()
            .map(|text| TableCell {
                text: text.clone(),
                bold: true,
            })
            .collect();
        Self {
            num_cols: header.len(),
            rows: vec![TableRow { cells }],
        }
    }

    /// Append a plain data row. Rows of the wrong width are refused.
    pub fn push_row(&mut self, row: &[String]) -> bool {
        if row.len() != self.num_cols {
            return false;
        }
        let cells = row
            .iter()
            .map(|text| TableCell {
                text: text.clone(),
                bold: false,
            })
            .collect();
        self.rows.push(TableRow { cells });
        true
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn header(&self) -> &TableRow {
        &self.rows[0]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Ordered block-level content of one output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputDocument {
    blocks: Vec<Block>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    pub fn push_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }
}
