//! Default style part: one Normal paragraph style carrying the document
//! defaults (East-Asian font, justified alignment, spacing, East-Asian
//! line-breaking rules on, word-wrap-by-character off).

use super::{WML_NS, pt_to_half_points, pt_to_twips, xml_escape};
use crate::model::Document;

pub(super) fn styles_xml(doc: &Document) -> String {
    let font = xml_escape(&doc.default_font);
    let half = pt_to_half_points(doc.default_font_size);
    let after = pt_to_twips(doc.default_space_after_pt).max(0);
    let line = (doc.default_line_spacing * 240.0).round() as i32;
    let rfonts =
        format!(r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}"/>"#);

    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<w:styles xmlns:w="{WML_NS}">"#));
    xml.push_str(&format!(
        r#"<w:docDefaults><w:rPrDefault><w:rPr>{rfonts}<w:sz w:val="{half}"/><w:szCs w:val="{half}"/></w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>"#
    ));
    xml.push_str(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal">"#);
    xml.push_str(r#"<w:name w:val="Normal"/><w:qFormat/>"#);
    xml.push_str("<w:pPr>");
    xml.push_str(r#"<w:kinsoku w:val="true"/><w:wordWrap w:val="false"/>"#);
    xml.push_str(&format!(
        r#"<w:spacing w:before="0" w:after="{after}" w:line="{line}" w:lineRule="auto"/>"#
    ));
    xml.push_str(r#"<w:ind w:firstLine="0"/><w:jc w:val="both"/>"#);
    xml.push_str("</w:pPr>");
    xml.push_str(&format!(
        r#"<w:rPr>{rfonts}<w:sz w:val="{half}"/><w:szCs w:val="{half}"/></w:rPr>"#
    ));
    xml.push_str("</w:style></w:styles>");
    xml
}
