//! The directive grammar: every bracket-delimited tag the interpreter
//! understands, compiled once. Tags are matched independently by pattern;
//! anything unmatched is left for the final stripping pass.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Alignment;

pub const PAGE_BREAK: &str = "{페이지바꿈}";
pub const TABLE_END_SIMPLE: &str = "{표끝1}";
pub const TABLE_END_COMPLEX: &str = "{표끝2}";

pub const HEADER_ROW_MARKER: &str = "{제목행}";
pub const GRAY_ROW_MARKER: &str = "{회색}";
pub const NAVY_ROW_MARKER: &str = "{남색}";

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+\}").unwrap());
static TABLE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{표시작([12])([^}]*)\}").unwrap());
static TABLE_FONT: Lazy<Regex> = Lazy::new(|| Regex::new(r"글꼴=([^,}]*)").unwrap());
static TABLE_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"크기=([0-9.]+)").unwrap());
static INDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{들여쓰기,1번줄:([0-9]+(?:\.[0-9]+)?),2번줄이하:([0-9]+(?:\.[0-9]+)?)\}").unwrap()
});
static LINE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+(?:\.\d+)?)줄\}").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{제목(\d)\.(\d)\}").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{그림:([^}]+)\}").unwrap());
static FONT_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([0-9.]+)pt\}").unwrap());
static INLINE_CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{>>\}|\{<<\}|\{탭\}|\{줄바꿈\}|\{문단바꿈\}").unwrap());
static COLUMN_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s*\{(\d+|-)\}\s*$").unwrap());
static DRIVE_FILE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/file/d/([a-zA-Z0-9_-]+)").unwrap());

/// Remove every bracket-delimited directive fragment from `text`.
pub fn strip(text: &str) -> String {
    ANY_TAG.replace_all(text, "").into_owned()
}

pub fn contains_tag(text: &str) -> bool {
    ANY_TAG.is_match(text)
}

/// Alignment keywords are tested as a fixed if/else-if chain, so the first
/// keyword in this scan order wins even when several occur on one line.
pub fn alignment(line: &str) -> Option<Alignment> {
    if line.contains("{왼쪽}") {
        Some(Alignment::Left)
    } else if line.contains("{가운데}") {
        Some(Alignment::Center)
    } else if line.contains("{오른쪽}") {
        Some(Alignment::Right)
    } else if line.contains("{양쪽}") {
        Some(Alignment::Justify)
    } else if line.contains("{균등}") {
        Some(Alignment::Distribute)
    } else {
        None
    }
}

/// `{들여쓰기,1번줄:F,2번줄이하:H}` → (first-line cm, hanging cm).
pub fn indentation(line: &str) -> Option<(f32, f32)> {
    let caps = INDENT.captures(line)?;
    let first_line = caps[1].parse().ok()?;
    let hanging = caps[2].parse().ok()?;
    Some((first_line, hanging))
}

/// `{N줄}` → per-paragraph line spacing.
pub fn line_spacing(line: &str) -> Option<f32> {
    LINE_SPACING.captures(line)?[1].parse().ok()
}

/// `{제목L.A}` → (level, alignment class).
pub fn heading(line: &str) -> Option<(u8, u8)> {
    let caps = HEADING.captures(line)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// `{그림:payload}` → the raw image reference, trimmed.
pub fn image_reference(text: &str) -> Option<&str> {
    IMAGE.captures(text).map(|c| c.get(1).unwrap().as_str().trim())
}

/// `{Npt}` → explicit point size, captured once for the whole line.
pub fn font_size_override(line: &str) -> Option<f32> {
    FONT_SIZE.captures(line)?[1].parse().ok()
}

/// Hosted-drive file id embedded in a `/file/d/<id>` URL shape.
pub fn drive_file_id(reference: &str) -> Option<&str> {
    DRIVE_FILE_ID
        .captures(reference)
        .map(|c| c.get(1).unwrap().as_str())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableDialect {
    Simple,
    Complex,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableParams {
    pub borderless: bool,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
}

impl TableDialect {
    pub fn end_sentinel(self) -> &'static str {
        match self {
            TableDialect::Simple => TABLE_END_SIMPLE,
            TableDialect::Complex => TABLE_END_COMPLEX,
        }
    }
}

/// Match a (trimmed) table-start line and parse its parameter fragment.
pub fn table_start(line: &str) -> Option<(TableDialect, TableParams)> {
    let caps = TABLE_START.captures(line)?;
    let dialect = match &caps[1] {
        "1" => TableDialect::Simple,
        _ => TableDialect::Complex,
    };
    let fragment = &caps[2];
    let params = TableParams {
        borderless: fragment.contains("테두리없음"),
        font_name: TABLE_FONT
            .captures(fragment)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty()),
        font_size: TABLE_SIZE
            .captures(fragment)
            .and_then(|c| c[1].trim().parse().ok()),
    };
    Some((dialect, params))
}

/// Explicit column placement at the end of a complex-dialect cell segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnTarget {
    /// 1-based column number as written in the markup.
    Index(usize),
    /// `{-}`: the last column of the grid.
    Last,
}

pub fn column_annotation(segment: &str) -> Option<(&str, ColumnTarget)> {
    let caps = COLUMN_INDEX.captures(segment)?;
    let text = caps.get(1).unwrap().as_str().trim();
    let target = match caps.get(2).unwrap().as_str() {
        "-" => ColumnTarget::Last,
        n => ColumnTarget::Index(n.parse().ok()?),
    };
    Some((text, target))
}

/// Inline control tokens of the run formatter, in source order, with the
/// literal text between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InlineToken<'a> {
    EmphasisOn,
    EmphasisOff,
    Tab,
    LineBreak,
    ParagraphBreak,
    Text(&'a str),
}

pub fn inline_tokens(line: &str) -> Vec<InlineToken<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in INLINE_CONTROL.find_iter(line) {
        if m.start() > last {
            tokens.push(InlineToken::Text(&line[last..m.start()]));
        }
        tokens.push(match m.as_str() {
            "{>>}" => InlineToken::EmphasisOn,
            "{<<}" => InlineToken::EmphasisOff,
            "{탭}" => InlineToken::Tab,
            "{줄바꿈}" => InlineToken::LineBreak,
            _ => InlineToken::ParagraphBreak,
        });
        last = m.end();
    }
    if last < line.len() {
        tokens.push(InlineToken::Text(&line[last..]));
    }
    tokens
}
