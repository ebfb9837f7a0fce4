//! End-to-end tests: convert markup and inspect the produced OOXML package.

use std::io::{Cursor, Read};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn convert(content: &str) -> Vec<u8> {
    docweave::convert(content, &docweave::Settings::default()).expect("conversion failed")
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("not a ZIP package");
    let mut text = String::new();
    zip.by_name(name)
        .unwrap_or_else(|_| panic!("missing part {name}"))
        .read_to_string(&mut text)
        .expect("part is not UTF-8");
    text
}

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

fn wml_all<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Vec<roxmltree::Node<'a, 'a>> {
    node.children()
        .filter(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
        .collect()
}

fn body_of<'a>(xml: &'a roxmltree::Document<'a>) -> roxmltree::Node<'a, 'a> {
    wml(xml.root_element(), "body").expect("missing w:body")
}

#[test]
fn package_has_all_required_parts() {
    let bytes = convert("hello");
    let mut zip = zip::ZipArchive::new(Cursor::new(&bytes[..])).unwrap();
    for name in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/styles.xml",
        "word/footer1.xml",
        "word/_rels/document.xml.rels",
    ] {
        assert!(zip.by_name(name).is_ok(), "missing {name}");
    }
}

#[test]
fn block_count_matches_content_groups() {
    // 2 content lines + 1 blank + 1 table block + 1 page break + 1 line.
    let bytes = convert("one\ntwo\n\n{표시작1}\na|b\n{표끝1}\n{페이지바꿈}\nthree");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let body = body_of(&xml);
    // sectPr is the only non-block body child.
    let paragraphs = wml_all(body, "p").len();
    let tables = wml_all(body, "tbl").len();
    assert_eq!(paragraphs, 5); // one, two, blank, page-break carrier, three
    assert_eq!(tables, 1);
}

#[test]
fn heading_line_emits_bold_sized_centered_run() {
    let bytes = convert("{제목1.2}Hello");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let body = body_of(&xml);
    let p = wml(body, "p").unwrap();

    let jc = wml(p, "pPr").and_then(|ppr| wml(ppr, "jc")).unwrap();
    assert_eq!(jc.attribute((WML_NS, "val")), Some("center"));

    let run = wml(p, "r").unwrap();
    let rpr = wml(run, "rPr").unwrap();
    assert!(wml(rpr, "b").is_some());
    let sz = wml(rpr, "sz").unwrap();
    assert_eq!(sz.attribute((WML_NS, "val")), Some("36"));
    let text = wml(run, "t").unwrap().text().unwrap_or_default();
    assert_eq!(text, "Hello");
}

#[test]
fn simple_table_merges_trailing_empty_cells() {
    let bytes = convert("{표시작1}\nA|B|C\nD|E\n{표끝1}");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let tbl = wml(body_of(&xml), "tbl").unwrap();

    let grid = wml(tbl, "tblGrid").unwrap();
    assert_eq!(wml_all(grid, "gridCol").len(), 3);

    let rows = wml_all(tbl, "tr");
    assert_eq!(rows.len(), 2);
    assert_eq!(wml_all(rows[0], "tc").len(), 3);

    // Row 2 keeps two cells; the second spans the absorbed empty column.
    let row2_cells = wml_all(rows[1], "tc");
    assert_eq!(row2_cells.len(), 2);
    let span = wml(row2_cells[1], "tcPr")
        .and_then(|pr| wml(pr, "gridSpan"))
        .and_then(|n| n.attribute((WML_NS, "val")))
        .unwrap();
    assert_eq!(span, "2");
}

#[test]
fn table_layout_is_fixed_and_full_width() {
    let bytes = convert("{표시작1}\na|b\n{표끝1}");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let tbl_pr = wml(wml(body_of(&xml), "tbl").unwrap(), "tblPr").unwrap();

    let layout = wml(tbl_pr, "tblLayout").unwrap();
    assert_eq!(layout.attribute((WML_NS, "type")), Some("fixed"));
    let width = wml(tbl_pr, "tblW").unwrap();
    assert_eq!(width.attribute((WML_NS, "w")), Some("5000"));
    assert_eq!(width.attribute((WML_NS, "type")), Some("pct"));
}

#[test]
fn row_markers_shade_and_repeat_headers() {
    let bytes = convert("{표시작1}\n{제목행}{회색}h1|h2\nb1|b2\n{표끝1}");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let rows = wml_all(wml(body_of(&xml), "tbl").unwrap(), "tr");

    let tr_pr = wml(rows[0], "trPr").expect("header row needs trPr");
    assert!(wml(tr_pr, "tblHeader").is_some());
    assert!(wml(rows[1], "trPr").is_none());

    for tc in wml_all(rows[0], "tc") {
        let shd = wml(wml(tc, "tcPr").unwrap(), "shd").expect("missing shading");
        assert_eq!(shd.attribute((WML_NS, "fill")), Some("D9D9D9"));
    }
    // The marker text itself must not leak into the cell.
    let first_text: String = rows[0].descendants().filter_map(|n| n.text()).collect();
    assert!(!first_text.contains("제목행"), "{first_text}");
    assert!(!first_text.contains('{'), "{first_text}");
}

#[test]
fn complex_table_spans_follow_explicit_addressing() {
    let bytes = convert("{표시작2}\nX{1}|Y{3}\n{표끝2}");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let tbl = wml(body_of(&xml), "tbl").unwrap();

    assert_eq!(wml_all(wml(tbl, "tblGrid").unwrap(), "gridCol").len(), 24);

    // After the empty-cell merge, the row is X (cols 1–2) then Y (cols 3–24).
    let cells = wml_all(wml_all(tbl, "tr")[0], "tc");
    assert_eq!(cells.len(), 2);
    let span_of = |tc: roxmltree::Node| {
        wml(tc, "tcPr")
            .and_then(|pr| wml(pr, "gridSpan"))
            .and_then(|n| n.attribute((WML_NS, "val")))
            .map(|v| v.to_string())
    };
    assert_eq!(span_of(cells[0]).as_deref(), Some("2"));
    assert_eq!(span_of(cells[1]).as_deref(), Some("22"));
}

#[test]
fn borderless_table_nils_every_cell_border() {
    let bytes = convert("{표시작1,테두리없음}\na|b\n{표끝1}");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let tbl = wml(body_of(&xml), "tbl").unwrap();

    assert!(wml(wml(tbl, "tblPr").unwrap(), "tblBorders").is_none());
    for tc in wml_all(wml_all(tbl, "tr")[0], "tc") {
        let borders = wml(wml(tc, "tcPr").unwrap(), "tcBorders").expect("missing tcBorders");
        for edge in ["top", "left", "bottom", "right"] {
            let n = wml(borders, edge).unwrap();
            assert_eq!(n.attribute((WML_NS, "val")), Some("nil"));
        }
    }
}

#[test]
fn page_break_directive_emits_page_break_run() {
    let bytes = convert("a\n{페이지바꿈}\nb");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let breaks: Vec<_> = xml
        .descendants()
        .filter(|n| {
            n.tag_name().name() == "br" && n.attribute((WML_NS, "type")) == Some("page")
        })
        .collect();
    assert_eq!(breaks.len(), 1);
}

#[test]
fn landscape_settings_swap_page_size() {
    let settings: docweave::Settings = serde_json::from_str(
        r#"{"page_orientation": "LANDSCAPE", "margin_left": 1.0, "margin_right": 1.0}"#,
    )
    .unwrap();
    let bytes = docweave::convert("hello", &settings).unwrap();
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let sect = wml(body_of(&xml), "sectPr").unwrap();

    let pg_sz = wml(sect, "pgSz").unwrap();
    assert_eq!(pg_sz.attribute((WML_NS, "orient")), Some("landscape"));
    let w: u32 = pg_sz.attribute((WML_NS, "w")).unwrap().parse().unwrap();
    let h: u32 = pg_sz.attribute((WML_NS, "h")).unwrap().parse().unwrap();
    assert!(w > h);

    let pg_mar = wml(sect, "pgMar").unwrap();
    assert_eq!(pg_mar.attribute((WML_NS, "left")), Some("567"));
}

#[test]
fn footer_carries_page_number_field() {
    let bytes = convert("x");
    let footer = read_part(&bytes, "word/footer1.xml");
    let xml = roxmltree::Document::parse(&footer).unwrap();
    let instr: String = xml
        .descendants()
        .filter(|n| n.tag_name().name() == "instrText")
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(instr, r"PAGE \* MERGEFORMAT");
    let fld_types: Vec<_> = xml
        .descendants()
        .filter(|n| n.tag_name().name() == "fldChar")
        .filter_map(|n| n.attribute((WML_NS, "fldCharType")))
        .collect();
    assert_eq!(fld_types, vec!["begin", "separate", "end"]);
}

#[test]
fn styles_part_uses_configured_font() {
    let settings: docweave::Settings =
        serde_json::from_str(r#"{"font_family_east_asia": "바탕", "font_size": 12.0}"#).unwrap();
    let bytes = docweave::convert("x", &settings).unwrap();
    let styles = read_part(&bytes, "word/styles.xml");
    assert!(styles.contains(r#"w:eastAsia="바탕""#));
    assert!(styles.contains(r#"<w:sz w:val="24"/>"#));
}

#[test]
fn no_directive_fragment_survives_into_visible_text() {
    let input = "{가운데}a{12pt}b\n{들여쓰기,1번줄:2.0,2번줄이하:1.0}c\n{표시작1}\n{남색}x|{?}y\n{표끝1}\n{제목3.1}T{>>}u{<<}";
    let bytes = convert(input);
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    for t in xml.descendants().filter(|n| n.tag_name().name() == "t") {
        let text = t.text().unwrap_or_default();
        assert!(!text.contains('{') || !text.contains('}'), "leaked tag: {text}");
    }
}

#[test]
fn emphasis_and_size_override_reach_the_runs() {
    let bytes = convert("a{>>}b{<<}{14pt}c");
    let doc_xml = read_part(&bytes, "word/document.xml");
    let xml = roxmltree::Document::parse(&doc_xml).unwrap();
    let p = wml(body_of(&xml), "p").unwrap();
    let runs = wml_all(p, "r");
    assert_eq!(runs.len(), 3);

    let rpr = wml(runs[1], "rPr").unwrap();
    assert!(wml(rpr, "b").is_some());
    let u = wml(rpr, "u").unwrap();
    assert_eq!(u.attribute((WML_NS, "val")), Some("single"));

    for run in &runs {
        let sz = wml(*run, "rPr")
            .and_then(|rpr| wml(rpr, "sz"))
            .and_then(|n| n.attribute((WML_NS, "val")))
            .unwrap();
        assert_eq!(sz, "28");
    }
}
