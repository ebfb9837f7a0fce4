//! Table sub-parser: resolves both table dialects into a rectangular cell
//! grid, then applies row markers, empty-cell merging and border handling.

use super::tags;
use super::tags::{ColumnTarget, TableDialect, TableParams};
use crate::images;
use crate::model::{Alignment, InlineImage, Paragraph, Run, Table, TableCell, TableRow};

/// Complex-dialect grids always have this many slots.
const COMPLEX_COLUMNS: usize = 24;

/// Row shading fills.
const GRAY_FILL: [u8; 3] = [0xD9, 0xD9, 0xD9];
const NAVY_FILL: [u8; 3] = [0x00, 0x00, 0x80];
const WHITE: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Whole-row effects, extracted from the raw first cell before any text
/// cleaning touches it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct RowMarkers {
    header: bool,
    gray: bool,
    navy: bool,
}

fn scan_row_markers(first_cell: &str) -> RowMarkers {
    RowMarkers {
        header: first_cell.contains(tags::HEADER_ROW_MARKER),
        gray: first_cell.contains(tags::GRAY_ROW_MARKER),
        navy: first_cell.contains(tags::NAVY_ROW_MARKER),
    }
}

/// Parse the captured interior lines of a table block. Returns `None` for a
/// block with no lines at all (nothing to emit, not an error).
pub fn parse_block(dialect: TableDialect, params: &TableParams, lines: &[&str]) -> Option<Table> {
    let grid = match dialect {
        TableDialect::Simple => simple_grid(lines),
        TableDialect::Complex => complex_grid(lines),
    };
    let columns = grid.first().map(|row| row.len()).unwrap_or(0);
    if grid.is_empty() || columns == 0 {
        return None;
    }

    let mut rows = Vec::with_capacity(grid.len());
    for grid_row in &grid {
        let markers = scan_row_markers(&grid_row[0]);
        let cells = grid_row
            .iter()
            .map(|text| build_cell(text, params, markers, grid_row.len()))
            .collect();
        rows.push(TableRow {
            cells,
            header: false,
        });
    }

    let mut table = Table {
        rows,
        columns,
        borderless: params.borderless,
        ..Table::default()
    };

    for row in &mut table.rows {
        merge_empty_cells(row);
    }
    mark_header_rows(&mut table, &grid);
    Some(table)
}

fn simple_grid(lines: &[&str]) -> Vec<Vec<String>> {
    let mut grid: Vec<Vec<String>> = lines
        .iter()
        .map(|line| line.split('|').map(str::to_string).collect())
        .collect();
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut grid {
        row.resize(columns, String::new());
    }
    grid
}

fn complex_grid(lines: &[&str]) -> Vec<Vec<String>> {
    lines.iter().map(|line| complex_row(line)).collect()
}

/// One complex-dialect row: an explicit fill cursor advances through the
/// 24 slots; an annotated segment jumps the cursor to just past its target.
fn complex_row(line: &str) -> Vec<String> {
    let mut row = vec![String::new(); COMPLEX_COLUMNS];
    let mut cursor = 0usize;
    for segment in line.split('|') {
        if let Some((text, target)) = tags::column_annotation(segment) {
            let index = match target {
                ColumnTarget::Last => Some(COMPLEX_COLUMNS - 1),
                ColumnTarget::Index(n) => n.checked_sub(1).filter(|i| *i < COMPLEX_COLUMNS),
            };
            match index {
                Some(i) => {
                    row[i] = text.to_string();
                    cursor = i + 1;
                }
                None => log::debug!("dropping out-of-range column annotation in {segment:?}"),
            }
        } else if cursor < COMPLEX_COLUMNS {
            row[cursor] = segment.to_string();
            cursor += 1;
        }
    }
    row
}

fn build_cell(text: &str, params: &TableParams, markers: RowMarkers, row_len: usize) -> TableCell {
    let mut paragraph = Paragraph::default();
    if !params.borderless {
        paragraph.space_after_pt = Some(0.0);
        paragraph.line_spacing = Some(1.5);
    }

    let mut cell = TableCell {
        span: 1,
        ..TableCell::default()
    };

    if let Some(reference) = tags::image_reference(text.trim()) {
        paragraph.alignment = Some(Alignment::Center);
        cell.v_center = true;
        paragraph.runs.push(Run {
            image: Some(InlineImage {
                source: images::resolve_source(reference),
                data: None,
            }),
            ..Run::default()
        });
    } else {
        // Marker tags stay in the text here; the assembler's final sweep
        // strips them.
        let mut run = Run::text(text);
        run.font_name = params.font_name.clone();
        run.font_size = params
            .font_size
            .or_else(|| (!params.borderless).then_some(10.0));
        if markers.gray || markers.navy {
            run.bold = true;
        }
        if markers.navy {
            run.color = Some(WHITE);
        }
        paragraph.runs.push(run);
    }

    if markers.gray {
        cell.shading = Some(GRAY_FILL);
    }
    if markers.navy {
        cell.shading = Some(NAVY_FILL);
        // Light dividers only apply between adjacent cells of the row.
        cell.white_dividers = row_len > 1;
    }
    cell.paragraph = paragraph;
    cell
}

fn cell_is_empty(cell: &TableCell) -> bool {
    cell.paragraph.runs.iter().all(|run| run.image.is_none())
        && cell
            .paragraph
            .runs
            .iter()
            .all(|run| run.text.trim().is_empty())
}

/// Scan right-to-left and fold trimmed-empty cells into their left
/// neighbor. A run of N empty trailing cells becomes one cell spanning
/// N+1 columns. Idempotent: merged-away cells have span 0 and are skipped.
pub(super) fn merge_empty_cells(row: &mut TableRow) {
    for i in (1..row.cells.len()).rev() {
        if row.cells[i].span > 0 && cell_is_empty(&row.cells[i]) {
            row.cells[i - 1].span += row.cells[i].span;
            row.cells[i].span = 0;
        }
    }
}

/// Header markers count only as a contiguous prefix within the first five
/// rows; scanning stops at the first unmarked row.
fn mark_header_rows(table: &mut Table, grid: &[Vec<String>]) {
    for (row, grid_row) in table.rows.iter_mut().zip(grid).take(5) {
        if !scan_row_markers(&grid_row[0]).header {
            break;
        }
        row.header = true;
    }
}
