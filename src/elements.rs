//! The structured-JSON contract shared by extraction and rendering.
//!
//! Phase 1 asks the model for a single object:
//!
//! ```json
//! { "document_elements": [ { "type": "heading_1", "content": "Title" }, ... ] }
//! ```
//!
//! Phase 2 validates that shape once per file and hands the ordered element
//! list to the renderer. Only the top-level shape is strict; individual
//! elements are accepted as leniently as possible because the producer is a
//! language model.

use crate::error::Pdf2DocxError;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use tracing::warn;

/// Top-level JSON key holding the element list.
pub const ELEMENTS_KEY: &str = "document_elements";

/// One structural unit of document content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentElement {
    Heading1(String),
    Heading2(String),
    Heading3(String),
    Paragraph(String),
    /// GitHub-flavoured Markdown pipe table.
    TableMarkdown(String),
    /// Any other `type` tag. The tag is kept so the renderer can name it.
    Unknown { kind: String, content: String },
}

impl DocumentElement {
    /// Build an element from its wire `type` tag and content.
    pub fn from_parts(kind: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        match kind {
            "heading_1" => DocumentElement::Heading1(content),
            "heading_2" => DocumentElement::Heading2(content),
            "heading_3" => DocumentElement::Heading3(content),
            "paragraph" => DocumentElement::Paragraph(content),
            "table_markdown" => DocumentElement::TableMarkdown(content),
            other => DocumentElement::Unknown {
                kind: other.to_string(),
                content,
            },
        }
    }

    /// The wire `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            DocumentElement::Heading1(_) => "heading_1",
            DocumentElement::Heading2(_) => "heading_2",
            DocumentElement::Heading3(_) => "heading_3",
            DocumentElement::Paragraph(_) => "paragraph",
            DocumentElement::TableMarkdown(_) => "table_markdown",
            DocumentElement::Unknown { kind, .. } => kind,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            DocumentElement::Heading1(c)
            | DocumentElement::Heading2(c)
            | DocumentElement::Heading3(c)
            | DocumentElement::Paragraph(c)
            | DocumentElement::TableMarkdown(c) => c,
            DocumentElement::Unknown { content, .. } => content,
        }
    }

    /// Convert one array item. Returns `None` for items that are not objects.
    ///
    /// A missing `type` reads as `null`; non-string tags and contents use
    /// their JSON text; missing or `null` content is empty.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = match obj.get("type") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "null".to_string(),
        };
        let content = match obj.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Some(Self::from_parts(&kind, content))
    }
}

impl Serialize for DocumentElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DocumentElement", 2)?;
        s.serialize_field("type", self.kind())?;
        s.serialize_field("content", self.content())?;
        s.end()
    }
}

/// A validated `{ "document_elements": [...] }` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct StructuredDocument {
    #[serde(rename = "document_elements")]
    pub elements: Vec<DocumentElement>,
}

impl StructuredDocument {
    /// Parse and validate structured JSON text.
    ///
    /// # Errors
    /// - [`Pdf2DocxError::MalformedJson`] if the text is not JSON
    /// - [`Pdf2DocxError::MissingElementsKey`] if the root is not an object
    ///   with a `document_elements` array
    pub fn parse(json_text: &str) -> Result<Self, Pdf2DocxError> {
        let value: Value = serde_json::from_str(json_text)
            .map_err(|source| Pdf2DocxError::MalformedJson { source })?;
        Self::from_json_value(&value)
    }

    /// Validate an already-parsed JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self, Pdf2DocxError> {
        let items = value
            .get(ELEMENTS_KEY)
            .and_then(Value::as_array)
            .ok_or(Pdf2DocxError::MissingElementsKey)?;

        let mut elements = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match DocumentElement::from_value(item) {
                Some(el) => elements.push(el),
                None => warn!("Skipping element {}: not a JSON object", i),
            }
        }
        Ok(Self { elements })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Pretty-printed JSON in the wire format.
    pub fn to_json_pretty(&self) -> Result<String, Pdf2DocxError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Pdf2DocxError::SerializeFailed {
                what: "elements",
                detail: e.to_string(),
            })
    }
}
