//! The markup interpreter: a single-pass, line-oriented compiler from the
//! brace-tag language to the document tree in [`crate::model`].

mod paragraph;
pub mod table;
pub mod tags;

use crate::model::{Block, Paragraph, Table, TableLayout};

/// Translate the full line sequence into blocks. One forward pass, one
/// line cursor; the table sub-parser is the only bounded lookahead.
pub fn parse(content: &str) -> Vec<Block> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();

        if trimmed == tags::PAGE_BREAK {
            blocks.push(Block::PageBreak);
            i += 1;
            continue;
        }

        if let Some((dialect, params)) = tags::table_start(trimmed) {
            let end = dialect.end_sentinel();
            let mut body = Vec::new();
            i += 1;
            while i < lines.len() && lines[i].trim() != end {
                body.push(lines[i]);
                i += 1;
            }
            if i == lines.len() {
                // Missing terminator: everything up to EOF became the body.
                log::warn!("unterminated table block, consumed {} lines", body.len());
            } else {
                i += 1; // skip the end sentinel
            }
            if let Some(table) = table::parse_block(dialect, &params, &body) {
                blocks.push(Block::Table(table));
            }
            continue;
        }

        if trimmed.is_empty() {
            blocks.push(Block::Paragraph(Paragraph::default()));
            i += 1;
            continue;
        }

        blocks.extend(
            paragraph::format_line(lines[i])
                .into_iter()
                .map(Block::Paragraph),
        );
        i += 1;
    }
    blocks
}

/// Post-processing passes, run once over the finished tree. They operate on
/// already-placed content, so ordering relative to parsing matters.
pub fn postprocess(blocks: &mut [Block]) {
    for block in blocks.iter_mut() {
        match block {
            Block::Table(table) => {
                normalize_table_layout(table);
                for row in &mut table.rows {
                    for cell in &mut row.cells {
                        strip_residual_tags(&mut cell.paragraph);
                    }
                }
            }
            Block::Paragraph(p) => strip_residual_tags(p),
            Block::PageBreak => {}
        }
    }
}

fn normalize_table_layout(table: &mut Table) {
    table.layout = TableLayout::FixedFullWidth;
}

/// Safety net for tags a stage read but did not erase inline (row markers,
/// size captures). Break markers and image runs are left untouched.
fn strip_residual_tags(paragraph: &mut Paragraph) {
    for run in &mut paragraph.runs {
        if run.break_kind.is_some() || run.image.is_some() {
            continue;
        }
        if tags::contains_tag(&run.text) {
            run.text = tags::strip(&run.text);
        }
    }
}
