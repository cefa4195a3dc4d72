//! Input validation: make sure a path is a readable PDF before pdfium sees it.
//!
//! pdfium reports a non-PDF or unreadable file as a generic load failure.
//! Checking existence, permissions and the `%PDF` magic bytes up front gives
//! the operator an error that names the actual problem.

use crate::error::Pdf2DocxError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable and starts with `%PDF`.
pub fn validate_pdf(path: &Path) -> Result<PathBuf, Pdf2DocxError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(Pdf2DocxError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2DocxError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DocxError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2DocxError::FileNotFound { path });
        }
    }

    debug!("Validated PDF input: {}", path.display());
    Ok(path)
}
