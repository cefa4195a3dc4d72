//! Image encoding: `DynamicImage` → base64 PNG wrapped in `ImageData`.
//!
//! PNG keeps rendered text crisp; JPEG artefacts around glyphs make table
//! cells and headings harder for the model to read. `detail: "high"` lets
//! GPT-4-class models tile the page instead of reading a single downscaled
//! overview.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as a base64 PNG for the VLM request.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded page image: {} bytes PNG, {} bytes base64", buf.len(), b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encodes_png_payload() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 4, Rgba([0, 0, 0, 255])));
        let data = encode_page(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }
}
