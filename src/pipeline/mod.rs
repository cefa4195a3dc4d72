//! Rendering stages for structured-JSON-to-DOCX conversion.
//!
//! Each submodule implements exactly one transformation step, and none of
//! them touch the network or the LLM client.
//!
//! ## Data Flow
//!
//! ```text
//! JSON text ──▶ assemble ──▶ render (per element) ──▶ docx
//!                               │
//!                               └─▶ table (table_markdown only)
//! ```
//!
//! 1. [`assemble`] — validate the `document_elements` contract and drive
//!    the renderer in element order
//! 2. [`render`]   — map one element onto styled blocks, with visible
//!    fallbacks instead of errors
//! 3. [`table`]    — lenient Markdown pipe-table parser
//! 4. [`docx`]     — write the finished document as an OOXML package

pub mod assemble;
pub mod docx;
pub mod render;
pub mod table;
