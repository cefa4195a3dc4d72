//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! pdfium keeps thread-local state and blocks for the whole render, so the
//! work runs under `tokio::task::spawn_blocking`. The longest edge of each
//! page is capped at `max_rendered_pixels` regardless of the physical page
//! size, which keeps memory bounded for posters and oversized scans.

use crate::config::ExtractionConfig;
use crate::error::{PageError, Pdf2DocxError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a libpdfium file or the directory holding it.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// One rendered page: `(page_num, image)` with 1-indexed page numbers.
pub type RenderedPage = Result<(usize, DynamicImage), PageError>;

/// Rasterise all pages of the PDF at `pdf_path`.
///
/// Opening the document is fatal for the file; a page that fails to render
/// yields a [`PageError::RenderFailed`] entry and the rest continue.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ExtractionConfig,
) -> Result<Vec<RenderedPage>, Pdf2DocxError> {
    let path = pdf_path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();

    tokio::task::spawn_blocking(move || render_pages_blocking(&path, max_pixels, password.as_deref()))
        .await
        .map_err(|e| Pdf2DocxError::RenderTaskFailed {
            path: pdf_path.to_path_buf(),
            detail: e.to_string(),
        })?
}

/// Bind to `PDFIUM_LIB_PATH` when set, otherwise to the system library.
fn bind_pdfium() -> Result<Pdfium, Pdf2DocxError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(p) if !p.is_empty() => {
            let p = PathBuf::from(p);
            let lib = if p.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&p)
            } else {
                p
            };
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| Pdf2DocxError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

fn render_pages_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<RenderedPage>, Pdf2DocxError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2DocxError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2DocxError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2DocxError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let rendered = page
            .render_with_config(&render_config)
            .map(|bitmap| bitmap.as_image())
            .map_err(|e| PageError::RenderFailed {
                page: page_num,
                detail: format!("{e:?}"),
            });

        if let Ok(ref image) = rendered {
            debug!(
                "Rendered page {} → {}x{} px",
                page_num,
                image.width(),
                image.height()
            );
        }
        results.push(rendered.map(|image| (page_num, image)));
    }

    Ok(results)
}
