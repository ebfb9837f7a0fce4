//! Image pipeline: resolve a markup image reference to a download URL,
//! fetch it, probe its native size and fit it to the available text width.
//! A failed fetch degrades to an inline placeholder run; it never aborts
//! the conversion.

use std::io::Cursor;

use crate::markup::tags;
use crate::model::{
    Block, EmbeddedImage, ImageFormat, ImageSource, Paragraph, Run, SectionProperties,
};

const EMU_PER_PIXEL: i64 = 9525;
/// Images inside table cells get a small fixed inset off the text width.
const CELL_INSET_EMU: i64 = 180_000; // 0.5 cm
const USER_AGENT: &str = "Mozilla/5.0";

/// A reference is either a hosted-drive file link or a direct URL.
pub(crate) fn resolve_source(reference: &str) -> ImageSource {
    match tags::drive_file_id(reference) {
        Some(id) => ImageSource::DriveId(id.to_string()),
        None => ImageSource::Url(reference.to_string()),
    }
}

/// Fetch every pending image in the tree, serially, in document order.
pub fn fetch_all(blocks: &mut [Block], section: &SectionProperties) {
    let budget = section.text_width_emu();
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build();

    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph(p) => fetch_paragraph(p, &client, budget),
            Block::Table(table) => {
                let cell_budget = (budget - CELL_INSET_EMU).max(1);
                for row in &mut table.rows {
                    for cell in &mut row.cells {
                        fetch_paragraph(&mut cell.paragraph, &client, cell_budget);
                    }
                }
            }
            Block::PageBreak => {}
        }
    }
}

fn fetch_paragraph(
    paragraph: &mut Paragraph,
    client: &reqwest::Result<reqwest::blocking::Client>,
    budget: i64,
) {
    for run in &mut paragraph.runs {
        let Some(image) = run.image.as_mut() else {
            continue;
        };
        let result = match client {
            Ok(client) => fetch_one(client, &image.source, budget),
            Err(e) => Err(format!("HTTP client unavailable: {e}")),
        };
        match result {
            Ok(embedded) => image.data = Some(embedded),
            Err(err) => {
                log::warn!("image fetch failed for {:?}: {err}", image.source);
                *run = Run::text(format!("[이미지 로드 오류: {err}]"));
            }
        }
    }
}

fn fetch_one(
    client: &reqwest::blocking::Client,
    source: &ImageSource,
    budget: i64,
) -> Result<EmbeddedImage, String> {
    let url = source.download_url();
    let response = client
        .get(&url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;
    let data = response.bytes().map_err(|e| e.to_string())?.to_vec();
    decode(data, budget)
}

/// Probe format and pixel size, then compute the display extent in EMU:
/// native size unless the native width exceeds the budget, in which case
/// the image is scaled down preserving aspect ratio.
pub(crate) fn decode(data: Vec<u8>, budget: i64) -> Result<EmbeddedImage, String> {
    let format = match image::guess_format(&data) {
        Ok(image::ImageFormat::Png) => ImageFormat::Png,
        Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        Ok(other) => return Err(format!("unsupported image format {other:?}")),
        Err(e) => return Err(e.to_string()),
    };
    let (pixel_width, pixel_height) = image::ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())?;

    let native_width = pixel_width as i64 * EMU_PER_PIXEL;
    let native_height = pixel_height as i64 * EMU_PER_PIXEL;
    let (display_width, display_height) = if native_width > budget {
        (budget, native_height * budget / native_width.max(1))
    } else {
        (native_width, native_height)
    };

    Ok(EmbeddedImage {
        data,
        format,
        pixel_width,
        pixel_height,
        display_width,
        display_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn direct_url_passes_through() {
        let source = resolve_source("https://example.com/pic.png");
        assert_eq!(source, ImageSource::Url("https://example.com/pic.png".into()));
        assert_eq!(source.download_url(), "https://example.com/pic.png");
    }

    #[test]
    fn drive_link_resolves_to_download_url() {
        let source = resolve_source("https://drive.google.com/file/d/abc123/view?usp=sharing");
        assert_eq!(source, ImageSource::DriveId("abc123".into()));
        assert_eq!(
            source.download_url(),
            "https://drive.google.com/uc?export=download&id=abc123"
        );
    }

    #[test]
    fn small_image_keeps_native_size() {
        let embedded = decode(png_bytes(100, 50), 5_000_000).unwrap();
        assert_eq!(embedded.format, ImageFormat::Png);
        assert_eq!(embedded.pixel_width, 100);
        assert_eq!(embedded.display_width, 100 * EMU_PER_PIXEL);
        assert_eq!(embedded.display_height, 50 * EMU_PER_PIXEL);
    }

    #[test]
    fn wide_image_is_scaled_to_budget_preserving_aspect() {
        let budget = 1_000_000;
        let embedded = decode(png_bytes(1000, 500), budget).unwrap();
        assert_eq!(embedded.display_width, budget);
        assert_eq!(embedded.display_height, budget / 2);
    }

    #[test]
    fn garbage_bytes_are_a_recoverable_error() {
        assert!(decode(b"not an image".to_vec(), 1_000_000).is_err());
    }
}
