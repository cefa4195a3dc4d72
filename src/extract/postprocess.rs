//! Post-processing: turn a raw model reply into a validated element list.
//!
//! Even when told to answer with bare JSON, models regularly:
//!
//! - wrap the object in ` ```json ... ``` ` fences
//! - add a sentence of commentary before or after the object
//! - emit a UTF-8 BOM or zero-width characters
//! - return nothing at all for blank pages
//!
//! The rules here strip those artefacts before validation so a usable reply
//! is never rejected for its packaging.

use crate::elements::StructuredDocument;
use once_cell::sync::Lazy;
use regex::Regex;

/// Clean and validate one page's reply.
///
/// An empty reply is an empty element list (blank page). Otherwise the reply
/// must contain a JSON object with a `document_elements` array.
pub fn parse_page_response(raw: &str) -> Result<StructuredDocument, String> {
    let cleaned = remove_invisible_chars(raw);
    let cleaned = strip_code_fences(&cleaned);
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Ok(StructuredDocument::default());
    }

    let candidate = extract_json_object(cleaned).unwrap_or(cleaned);
    StructuredDocument::parse(candidate).map_err(|e| e.to_string())
}

// ── Rule 1: Strip invisible Unicode ──────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}'))
        .collect()
}

// ── Rule 2: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 3: Isolate the outermost JSON object ────────────────────────────────

/// Slice from the first `{` to its matching `}`, honouring string literals.
fn extract_json_object(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in input[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::DocumentElement;

    const BODY: &str = r#"{"document_elements":[{"type":"paragraph","content":"hi"}]}"#;

    #[test]
    fn plain_json_passes() {
        let doc = parse_page_response(BODY).unwrap();
        assert_eq!(doc.elements, vec![DocumentElement::Paragraph("hi".into())]);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let doc = parse_page_response(&format!("```json\n{BODY}\n```")).unwrap();
        assert_eq!(doc.len(), 1);
        let doc = parse_page_response(&format!("```\n{BODY}\n```\n")).unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn commentary_around_object_is_ignored() {
        let reply = format!("Here is the structure:\n{BODY}\nLet me know if you need more.");
        assert_eq!(parse_page_response(&reply).unwrap().len(), 1);
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_extraction() {
        let reply = r#"note {"document_elements":[{"type":"paragraph","content":"set {a} \"}\""}]} trailing"#;
        let doc = parse_page_response(reply).unwrap();
        assert_eq!(doc.elements[0].content(), r#"set {a} "}""#);
    }

    #[test]
    fn bom_and_zero_width_removed() {
        let reply = format!("\u{FEFF}{BODY}\u{200B}");
        assert_eq!(parse_page_response(&reply).unwrap().len(), 1);
    }

    #[test]
    fn empty_reply_is_blank_page() {
        assert!(parse_page_response("  \n").unwrap().is_empty());
        assert!(parse_page_response("```json\n\n```").unwrap().is_empty());
    }

    #[test]
    fn missing_key_is_reported() {
        let err = parse_page_response(r#"{"elements": []}"#).unwrap_err();
        assert!(err.contains("document_elements"), "got: {err}");
    }

    #[test]
    fn prose_only_reply_is_malformed() {
        let err = parse_page_response("I could not read this page.").unwrap_err();
        assert!(err.contains("Malformed JSON"), "got: {err}");
    }
}
