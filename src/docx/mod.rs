//! OOXML package writer: serializes the document tree into a complete
//! WordprocessingML ZIP package (document, styles, footer, media parts).

mod styles;

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::model::{
    Alignment, Block, BreakKind, Document, EmbeddedImage, ImageFormat, Orientation, Paragraph,
    Run, Table, TableLayout, TableRow,
};

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Relationship ids rId1/rId2 are pinned to styles and the footer; media
/// parts start here.
const FIRST_IMAGE_REL: usize = 3;

pub(super) fn pt_to_twips(pt: f32) -> i32 {
    (pt * 20.0).round() as i32
}

pub(super) fn pt_to_half_points(pt: f32) -> u32 {
    (pt * 2.0).round().max(0.0) as u32
}

fn cm_to_twips_signed(cm: f32) -> i32 {
    (cm * 360_000.0 / 635.0).round() as i32
}

/// 240ths of a line, the WML unit for proportional line spacing.
fn spacing_to_line(spacing: f32) -> i32 {
    (spacing * 240.0).round() as i32
}

pub(super) fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn alignment_val(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
        Alignment::Distribute => "distribute",
    }
}

/// A media part referenced from document.xml, in encounter order.
struct Media<'a> {
    image: &'a EmbeddedImage,
}

impl Media<'_> {
    fn extension(&self) -> &'static str {
        match self.image.format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// Serialize the whole package. The only errors here are structural (ZIP
/// or I/O on the in-memory buffer); content issues were resolved earlier.
pub fn write(doc: &Document) -> Result<Vec<u8>, Error> {
    let mut media = Vec::new();
    let document_xml = document_xml(doc, &mut media);
    let styles_xml = styles::styles_xml(doc);
    let footer_xml = footer_xml();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml().as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml.as_bytes())?;

    zip.start_file("word/styles.xml", options)?;
    zip.write_all(styles_xml.as_bytes())?;

    zip.start_file("word/footer1.xml", options)?;
    zip.write_all(footer_xml.as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", options)?;
    zip.write_all(document_rels_xml(&media).as_bytes())?;

    for (i, m) in media.iter().enumerate() {
        zip.start_file(format!("word/media/image{}.{}", i + 1, m.extension()), options)?;
        zip.write_all(&m.image.data)?;
    }

    let cursor = zip.finish()?;
    log::debug!(
        "wrote OOXML package: {} bytes, {} media parts",
        cursor.get_ref().len(),
        media.len()
    );
    Ok(cursor.into_inner())
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn content_types_xml() -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);
    xml.push_str(r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

fn document_rels_xml(media: &[Media]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    xml.push_str(&format!(
        r#"<Relationship Id="rId1" Type="{REL_NS}/styles" Target="styles.xml"/>"#
    ));
    xml.push_str(&format!(
        r#"<Relationship Id="rId2" Type="{REL_NS}/footer" Target="footer1.xml"/>"#
    ));
    for (i, m) in media.iter().enumerate() {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_NS}/image" Target="media/image{}.{}"/>"#,
            FIRST_IMAGE_REL + i,
            i + 1,
            m.extension()
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn document_xml<'a>(doc: &'a Document, media: &mut Vec<Media<'a>>) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<w:document xmlns:w="{WML_NS}" xmlns:r="{REL_NS}" xmlns:wp="{WPD_NS}" xmlns:a="{DML_NS}" xmlns:pic="{PIC_NS}"><w:body>"#
    ));
    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => paragraph_xml(p, &mut xml, media),
            Block::Table(table) => table_xml(table, doc, &mut xml, media),
            Block::PageBreak => {
                xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
            }
        }
    }
    sect_pr_xml(doc, &mut xml);
    xml.push_str("</w:body></w:document>");
    xml
}

fn paragraph_xml<'a>(p: &'a Paragraph, xml: &mut String, media: &mut Vec<Media<'a>>) {
    xml.push_str("<w:p>");
    paragraph_props_xml(p, xml);
    for run in &p.runs {
        run_xml(run, xml, media);
    }
    xml.push_str("</w:p>");
}

fn paragraph_props_xml(p: &Paragraph, xml: &mut String) {
    let has_spacing = p.line_spacing.is_some() || p.space_after_pt.is_some();
    if p.alignment.is_none()
        && p.indent_left_cm.is_none()
        && p.first_line_indent_cm.is_none()
        && !has_spacing
    {
        return;
    }
    xml.push_str("<w:pPr>");
    if has_spacing {
        xml.push_str("<w:spacing");
        if let Some(after) = p.space_after_pt {
            xml.push_str(&format!(r#" w:after="{}""#, pt_to_twips(after).max(0)));
        }
        if let Some(spacing) = p.line_spacing {
            xml.push_str(&format!(
                r#" w:line="{}" w:lineRule="auto""#,
                spacing_to_line(spacing)
            ));
        }
        xml.push_str("/>");
    }
    if p.indent_left_cm.is_some() || p.first_line_indent_cm.is_some() {
        xml.push_str("<w:ind");
        if let Some(left) = p.indent_left_cm {
            xml.push_str(&format!(r#" w:left="{}""#, cm_to_twips_signed(left)));
        }
        if let Some(first) = p.first_line_indent_cm {
            // A negative first-line offset is stored as a hanging indent.
            let twips = cm_to_twips_signed(first);
            if twips < 0 {
                xml.push_str(&format!(r#" w:hanging="{}""#, -twips));
            } else {
                xml.push_str(&format!(r#" w:firstLine="{twips}""#));
            }
        }
        xml.push_str("/>");
    }
    if let Some(alignment) = p.alignment {
        xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment_val(alignment)));
    }
    xml.push_str("</w:pPr>");
}

fn run_props_xml(run: &Run, xml: &mut String) {
    if !run.bold && !run.underline && run.font_size.is_none() && run.font_name.is_none()
        && run.color.is_none()
    {
        return;
    }
    xml.push_str("<w:rPr>");
    if let Some(name) = &run.font_name {
        let name = xml_escape(name);
        xml.push_str(&format!(
            r#"<w:rFonts w:ascii="{name}" w:hAnsi="{name}" w:eastAsia="{name}"/>"#
        ));
    }
    if run.bold {
        xml.push_str("<w:b/>");
    }
    if let Some([r, g, b]) = run.color {
        xml.push_str(&format!(r#"<w:color w:val="{r:02X}{g:02X}{b:02X}"/>"#));
    }
    if let Some(size) = run.font_size {
        let half = pt_to_half_points(size);
        xml.push_str(&format!(r#"<w:sz w:val="{half}"/><w:szCs w:val="{half}"/>"#));
    }
    if run.underline {
        xml.push_str(r#"<w:u w:val="single"/>"#);
    }
    xml.push_str("</w:rPr>");
}

fn run_xml<'a>(run: &'a Run, xml: &mut String, media: &mut Vec<Media<'a>>) {
    if let Some(kind) = run.break_kind {
        match kind {
            BreakKind::Line => xml.push_str("<w:r><w:br/></w:r>"),
            BreakKind::Page => xml.push_str(r#"<w:r><w:br w:type="page"/></w:r>"#),
        }
        return;
    }
    if let Some(image) = &run.image {
        // Pending images mean the fetch pass was skipped; there is nothing
        // to embed for them.
        let Some(embedded) = &image.data else {
            log::debug!("skipping unfetched image run for {:?}", image.source);
            return;
        };
        media.push(Media { image: embedded });
        let index = media.len();
        drawing_xml(embedded, index, xml);
        return;
    }
    xml.push_str("<w:r>");
    run_props_xml(run, xml);
    xml.push_str(&format!(
        r#"<w:t xml:space="preserve">{}</w:t>"#,
        xml_escape(&run.text)
    ));
    xml.push_str("</w:r>");
}

/// Inline picture with the fixed zero-width solid border the original
/// editor put on every image.
fn drawing_xml(image: &EmbeddedImage, index: usize, xml: &mut String) {
    let rel = FIRST_IMAGE_REL + index - 1;
    let cx = image.display_width;
    let cy = image.display_height;
    xml.push_str("<w:r><w:drawing>");
    xml.push_str(&format!(
        r#"<wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{index}" name="Picture {index}"/>"#
    ));
    xml.push_str(&format!(
        r#"<a:graphic><a:graphicData uri="{PIC_NS}"><pic:pic><pic:nvPicPr><pic:cNvPr id="{index}" name="Picture {index}"/><pic:cNvPicPr/></pic:nvPicPr>"#
    ));
    xml.push_str(&format!(
        r#"<pic:blipFill><a:blip r:embed="rId{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#
    ));
    xml.push_str(&format!(
        r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:ln w="0" cap="flat" cmpd="sng"><a:solidFill><a:srgbClr val="000000"/></a:solidFill><a:prstDash val="solid"/><a:miter lim="800000"/></a:ln></pic:spPr>"#
    ));
    xml.push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>");
}

fn table_xml<'a>(table: &'a Table, doc: &Document, xml: &mut String, media: &mut Vec<Media<'a>>) {
    if table.columns == 0 || table.rows.is_empty() {
        return;
    }
    let text_width = (doc.section.page_width
        - doc.section.margin_left
        - doc.section.margin_right) as i32;
    let col_width = text_width / table.columns as i32;

    xml.push_str("<w:tbl><w:tblPr>");
    match table.layout {
        TableLayout::FixedFullWidth => {
            xml.push_str(r#"<w:tblW w:w="5000" w:type="pct"/>"#);
        }
        TableLayout::Auto => {
            xml.push_str(r#"<w:tblW w:w="0" w:type="auto"/>"#);
        }
    }
    if !table.borderless {
        // Single hairline grid on every edge, like the Table Grid style.
        xml.push_str("<w:tblBorders>");
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            xml.push_str(&format!(
                r#"<w:{edge} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
            ));
        }
        xml.push_str("</w:tblBorders>");
    }
    if table.layout == TableLayout::FixedFullWidth {
        xml.push_str(r#"<w:tblLayout w:type="fixed"/>"#);
    }
    xml.push_str("</w:tblPr><w:tblGrid>");
    for i in 0..table.columns {
        // Distribute the rounding remainder into the last column.
        let width = if i == table.columns - 1 {
            text_width - col_width * (table.columns as i32 - 1)
        } else {
            col_width
        };
        xml.push_str(&format!(r#"<w:gridCol w:w="{width}"/>"#));
    }
    xml.push_str("</w:tblGrid>");

    for row in &table.rows {
        row_xml(row, table, col_width, xml, media);
    }
    xml.push_str("</w:tbl>");
}

fn row_xml<'a>(
    row: &'a TableRow,
    table: &Table,
    col_width: i32,
    xml: &mut String,
    media: &mut Vec<Media<'a>>,
) {
    xml.push_str("<w:tr>");
    if row.header {
        xml.push_str("<w:trPr><w:tblHeader/></w:trPr>");
    }
    let emitted: Vec<&crate::model::TableCell> =
        row.cells.iter().filter(|c| c.span > 0).collect();
    let last = emitted.len().saturating_sub(1);
    for (i, cell) in emitted.iter().enumerate() {
        xml.push_str("<w:tc><w:tcPr>");
        xml.push_str(&format!(
            r#"<w:tcW w:w="{}" w:type="dxa"/>"#,
            col_width * cell.span as i32
        ));
        if cell.span > 1 {
            xml.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, cell.span));
        }
        if table.borderless {
            xml.push_str("<w:tcBorders>");
            for edge in ["top", "left", "bottom", "right"] {
                xml.push_str(&format!(r#"<w:{edge} w:val="nil"/>"#));
            }
            xml.push_str("</w:tcBorders>");
        } else if cell.white_dividers && emitted.len() > 1 {
            xml.push_str("<w:tcBorders>");
            if i > 0 {
                xml.push_str(r#"<w:left w:val="single" w:sz="4" w:color="FFFFFF"/>"#);
            }
            if i < last {
                xml.push_str(r#"<w:right w:val="single" w:sz="4" w:color="FFFFFF"/>"#);
            }
            xml.push_str("</w:tcBorders>");
        }
        if let Some([r, g, b]) = cell.shading {
            xml.push_str(&format!(
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{r:02X}{g:02X}{b:02X}"/>"#
            ));
        }
        if cell.v_center {
            xml.push_str(r#"<w:vAlign w:val="center"/>"#);
        }
        xml.push_str("</w:tcPr>");
        paragraph_xml(&cell.paragraph, xml, media);
        xml.push_str("</w:tc>");
    }
    xml.push_str("</w:tr>");
}

fn sect_pr_xml(doc: &Document, xml: &mut String) {
    let s = &doc.section;
    xml.push_str("<w:sectPr>");
    xml.push_str(r#"<w:footerReference w:type="default" r:id="rId2"/>"#);
    xml.push_str(&format!(
        r#"<w:pgSz w:w="{}" w:h="{}"{}/>"#,
        s.page_width,
        s.page_height,
        match s.orientation {
            Orientation::Portrait => "",
            Orientation::Landscape => r#" w:orient="landscape""#,
        }
    ));
    xml.push_str(&format!(
        r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="720" w:footer="720" w:gutter="0"/>"#,
        s.margin_top, s.margin_right, s.margin_bottom, s.margin_left
    ));
    xml.push_str("</w:sectPr>");
}

/// Footer part: `- <page number> -`, centered, in 바탕 10 pt. The page
/// number is a literal PAGE field resolved by the renderer, not computed
/// here.
fn footer_xml() -> String {
    let rpr = r#"<w:rPr><w:rFonts w:ascii="바탕" w:hAnsi="바탕" w:eastAsia="바탕"/><w:sz w:val="20"/><w:szCs w:val="20"/></w:rPr>"#;
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:ftr xmlns:w="{WML_NS}">"#));
    xml.push_str(r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#);
    xml.push_str(&format!(
        r#"<w:r>{rpr}<w:t xml:space="preserve">- </w:t></w:r>"#
    ));
    xml.push_str(&format!(
        r#"<w:r>{rpr}<w:fldChar w:fldCharType="begin"/></w:r>"#
    ));
    xml.push_str(&format!(
        r#"<w:r>{rpr}<w:instrText xml:space="preserve">PAGE \* MERGEFORMAT</w:instrText></w:r>"#
    ));
    xml.push_str(&format!(
        r#"<w:r>{rpr}<w:fldChar w:fldCharType="separate"/></w:r>"#
    ));
    xml.push_str(&format!(r#"<w:r>{rpr}<w:t>1</w:t></w:r>"#));
    xml.push_str(&format!(
        r#"<w:r>{rpr}<w:fldChar w:fldCharType="end"/></w:r>"#
    ));
    xml.push_str(&format!(
        r#"<w:r>{rpr}<w:t xml:space="preserve"> -</w:t></w:r>"#
    ));
    xml.push_str("</w:p></w:ftr>");
    xml
}
