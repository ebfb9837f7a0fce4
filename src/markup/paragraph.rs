//! Paragraph-level directive resolution and run tokenization for one
//! content line. Never fails: malformed directives are left for the final
//! stripping pass or treated as plain text.

use super::tags;
use super::tags::InlineToken;
use crate::images;
use crate::model::{Alignment, InlineImage, Paragraph, Run};

/// level → heading point size
fn heading_size(level: u8) -> f32 {
    match level {
        1 => 18.0,
        2 => 16.0,
        3 => 14.0,
        _ => 12.0,
    }
}

/// alignment class → heading alignment
fn heading_alignment(class: u8) -> Alignment {
    match class {
        2 => Alignment::Center,
        3 => Alignment::Right,
        _ => Alignment::Left,
    }
}

/// Mode flags threaded through the token walk instead of loose mutables:
/// the emphasis toggle and the line-wide size override captured before
/// tokenization.
struct RunState {
    emphasis: bool,
    font_size: Option<f32>,
}

/// Format one content line into one or more paragraphs, in line order.
/// Always returns at least one (possibly empty) paragraph.
pub fn format_line(line: &str) -> Vec<Paragraph> {
    let mut paragraph = Paragraph::default();

    // Steps 1–3 apply to the original paragraph object only; a forced
    // paragraph break later on the line starts from defaults again.
    if let Some(alignment) = tags::alignment(line) {
        paragraph.alignment = Some(alignment);
    }
    if let Some((first_line, hanging)) = tags::indentation(line) {
        // The markup gives the first-line depth as an absolute offset from
        // the left margin; DOCX stores it relative to the hanging indent.
        paragraph.indent_left_cm = Some(hanging);
        paragraph.first_line_indent_cm = Some(first_line - hanging);
    }
    if let Some(spacing) = tags::line_spacing(line) {
        paragraph.line_spacing = Some(spacing);
    }

    if let Some((level, class)) = tags::heading(line) {
        // A heading consumes the whole line; any image tag on it is dead
        // text and gets stripped with the rest.
        let run = Run {
            text: tags::strip(line),
            bold: true,
            font_size: Some(heading_size(level)),
            ..Run::default()
        };
        paragraph.runs.push(run);
        paragraph.alignment = Some(heading_alignment(class));
        return vec![paragraph];
    }

    if let Some(reference) = tags::image_reference(line) {
        paragraph.runs.clear();
        paragraph.runs.push(Run {
            image: Some(InlineImage {
                source: images::resolve_source(reference),
                data: None,
            }),
            ..Run::default()
        });
        return vec![paragraph];
    }

    let mut paragraphs = Vec::new();
    let mut state = RunState {
        emphasis: false,
        font_size: tags::font_size_override(line),
    };

    for token in tags::inline_tokens(line) {
        match token {
            InlineToken::EmphasisOn => state.emphasis = true,
            InlineToken::EmphasisOff => state.emphasis = false,
            InlineToken::ParagraphBreak => {
                paragraphs.push(std::mem::take(&mut paragraph));
            }
            InlineToken::LineBreak => paragraph.runs.push(Run::line_break()),
            InlineToken::Tab => paragraph.runs.push(Run::text("\t")),
            InlineToken::Text(text) => {
                let clean = tags::strip(text);
                if clean.is_empty() {
                    continue;
                }
                paragraph.runs.push(Run {
                    text: clean,
                    bold: state.emphasis,
                    underline: state.emphasis,
                    font_size: state.font_size,
                    ..Run::default()
                });
            }
        }
    }
    paragraphs.push(paragraph);
    paragraphs
}
