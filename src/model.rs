#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// One page section. Lengths are in twips (1/20 pt), the native DOCX unit.
#[derive(Clone, Copy, Debug)]
pub struct SectionProperties {
    pub page_width: u32,
    pub page_height: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    pub orientation: Orientation,
}

impl SectionProperties {
    /// Width available for body content, in EMU (used as the image budget).
    pub fn text_width_emu(&self) -> i64 {
        let twips = self.page_width as i64 - self.margin_left as i64 - self.margin_right as i64;
        twips * 635
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Clone)]
pub struct EmbeddedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub display_width: i64,  // EMU
    pub display_height: i64, // EMU
}

/// Where an image reference points before it is fetched.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    Url(String),
    DriveId(String),
}

impl ImageSource {
    pub fn download_url(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::DriveId(id) => {
                format!("https://drive.google.com/uc?export=download&id={id}")
            }
        }
    }
}

/// An image run: the parser records the source, the fetch pass fills `data`.
/// A run whose fetch failed is replaced by a plain text placeholder instead.
#[derive(Clone)]
pub struct InlineImage {
    pub source: ImageSource,
    pub data: Option<EmbeddedImage>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BreakKind {
    Line,
    Page,
}

#[derive(Clone, Default)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
    /// Explicit point-size override; `None` inherits the document default.
    pub font_size: Option<f32>,
    pub font_name: Option<String>,
    pub color: Option<[u8; 3]>,
    pub break_kind: Option<BreakKind>,
    pub image: Option<InlineImage>,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            ..Run::default()
        }
    }

    pub fn line_break() -> Self {
        Run {
            break_kind: Some(BreakKind::Line),
            ..Run::default()
        }
    }
}

#[derive(Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    /// `None` inherits the default (justified) style alignment.
    pub alignment: Option<Alignment>,
    pub indent_left_cm: Option<f32>,
    pub first_line_indent_cm: Option<f32>,
    pub line_spacing: Option<f32>,
    pub space_after_pt: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TableLayout {
    #[default]
    Auto,
    /// Fixed column widths stretched to 100% of the text width.
    FixedFullWidth,
}

#[derive(Clone, Default)]
pub struct TableCell {
    pub paragraph: Paragraph,
    /// Grid columns this cell spans. Zero means the cell was merged away
    /// into a neighbor on its left and must not be emitted.
    pub span: usize,
    pub shading: Option<[u8; 3]>,
    /// Light vertical dividers between adjacent cells of a navy row.
    pub white_dividers: bool,
    pub v_center: bool,
}

#[derive(Clone, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Repeats at the top of every page the table flows onto.
    pub header: bool,
}

#[derive(Clone, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
    pub columns: usize,
    pub borderless: bool,
    pub layout: TableLayout,
}

pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    PageBreak,
}

/// The complete conversion result handed to the OOXML writer.
pub struct Document {
    pub blocks: Vec<Block>,
    pub section: SectionProperties,
    pub default_font: String,
    pub default_font_size: f32,
    pub default_line_spacing: f32,
    pub default_space_after_pt: f32,
}
