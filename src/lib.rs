mod docx;
mod error;
mod images;
mod markup;
mod model;
mod settings;

pub use error::Error;
pub use settings::{DOCX_MIME, PageOrientation, Settings, generate_filename};

use std::path::Path;
use std::time::Instant;

/// Convert markup text into a complete OOXML word-processing package.
///
/// One call, one independent document: settings are read-only, all state
/// lives in the tree built here. Malformed markup never fails; only
/// invalid settings or package serialization can return an error.
pub fn convert(content: &str, settings: &Settings) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let section = settings.section_properties()?;
    let mut blocks = markup::parse(content);
    let t_parse = t0.elapsed();

    images::fetch_all(&mut blocks, &section);
    let t_fetch = t0.elapsed();

    markup::postprocess(&mut blocks);

    let doc = model::Document {
        blocks,
        section,
        default_font: settings.font_family_east_asia.clone(),
        default_font_size: settings.font_size,
        default_line_spacing: settings.line_spacing,
        default_space_after_pt: settings.para_spacing_after,
    };
    let bytes = docx::write(&doc)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, fetch={:.1}ms, emit={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_fetch - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_fetch).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}

pub fn convert_to_file(content: &str, settings: &Settings, output: &Path) -> Result<(), Error> {
    let bytes = convert(content, settings)?;
    std::fs::write(output, &bytes).map_err(Error::Io)
}
