use pdf_writer::Content;

use crate::fonts::StandardFont;
use crate::geometry::mm_to_pt;
use crate::model::TableRow;

use super::Canvas;
use super::layout::show_text;

const TABLE_FONT_SIZE: f32 = 10.0;
const ROW_HEIGHT_MM: f32 = 8.0;
const CELL_TEXT_INSET_MM: f32 = 1.0;
const CELL_BASELINE_MM: f32 = 5.0;
const BORDER_WIDTH_MM: f32 = 0.1;
const HEADER_FILL: f32 = 240.0 / 255.0;
/// Cell text is cut rather than wrapped.
const MAX_CELL_CHARS: usize = 20;

fn cell_label(text: &str) -> String {
    text.split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_CELL_CHARS)
        .collect()
}

fn draw_cell(content: &mut Content, x: f32, row_bottom: f32, width: f32, height: f32, header: bool) {
    if header {
        content.save_state();
        content.set_fill_gray(HEADER_FILL);
        content.rect(x, row_bottom, width, height);
        content.fill_nonzero();
        content.restore_state();
    }
    content.save_state();
    content.set_line_width(mm_to_pt(BORDER_WIDTH_MM));
    content.set_stroke_gray(0.0);
    content.rect(x, row_bottom, width, height);
    content.stroke();
    content.restore_state();
}

/// Fixed-height grid with equal column widths. Rows move to a new page
/// individually when they would cross the bottom limit.
pub(super) fn render_table(canvas: &mut Canvas, rows: &[TableRow]) {
    let col_count = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0).max(1);
    let col_width = canvas.content_width() / col_count as f32;
    let row_h = mm_to_pt(ROW_HEIGHT_MM);

    for (ri, row) in rows.iter().enumerate() {
        canvas.ensure_room(row_h);
        let row_top = canvas.y;
        let row_bottom = canvas.to_pdf_y(row_top + row_h);
        log::debug!(
            "TABLE row={} cells={} header={} top={:.2}",
            ri,
            row.cells.len(),
            row.is_header,
            row_top
        );

        let font = if row.is_header {
            StandardFont::Bold
        } else {
            StandardFont::Regular
        };
        let left = canvas.margin_left();
        let baseline = canvas.to_pdf_y(row_top + mm_to_pt(CELL_BASELINE_MM));
        let content = canvas.content();
        for (ci, cell) in row.cells.iter().enumerate() {
            let x = left + ci as f32 * col_width;
            draw_cell(content, x, row_bottom, col_width, row_h, row.is_header);
            let label = cell_label(&cell.text());
            if !label.is_empty() {
                show_text(
                    content,
                    font,
                    TABLE_FONT_SIZE,
                    x + mm_to_pt(CELL_TEXT_INSET_MM),
                    baseline,
                    &label,
                );
            }
        }

        canvas.y += row_h;
    }
}
