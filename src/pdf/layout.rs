use pdf_writer::{Content, Name, Str};

use crate::fonts::{StandardFont, to_winansi_bytes};
use crate::model::{Alignment, Run};

pub(super) struct WordChunk {
    pub(super) font: StandardFont,
    pub(super) text: String,
    pub(super) font_size: f32,
    pub(super) color: Option<[u8; 3]>,
    pub(super) highlight: Option<[u8; 3]>,
    pub(super) x_offset: f32, // x relative to line start
    pub(super) width: f32,
    pub(super) underline: bool,
    pub(super) strikethrough: bool,
}

pub(super) struct TextLine {
    pub(super) chunks: Vec<WordChunk>,
    pub(super) total_width: f32,
}

/// How a block draws its runs.
pub(super) struct RunStyle {
    pub(super) font_size: f32,
    pub(super) force_bold: bool,
    pub(super) color: Option<[u8; 3]>,
}

fn finish_line(chunks: &mut Vec<WordChunk>) -> TextLine {
    let total_width = chunks.last().map(|c| c.x_offset + c.width).unwrap_or(0.0);
    TextLine {
        chunks: std::mem::take(chunks),
        total_width,
    }
}

/// Layout runs into wrapped lines.
/// Handles cross-run contiguous text correctly: no space is inserted between
/// runs unless the preceding text ended with whitespace or the new run starts
/// with whitespace (e.g., "bold" + ", " → "bold," not "bold ,").
/// A `'\n'` inside run text always ends the current line.
pub(super) fn build_paragraph_lines(
    runs: &[Run],
    style: &RunStyle,
    max_width: f32,
    first_line_hanging: f32,
    highlight_rgb: impl Fn(&str) -> [u8; 3],
) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_chunks: Vec<WordChunk> = Vec::new();
    let mut current_x: f32 = 0.0;
    let mut prev_ended_with_ws = false;
    let mut prev_space_w: f32 = 0.0;
    let fs = style.font_size;

    for run in runs {
        let font = StandardFont::select(run.bold || style.force_bold, run.italic);
        let space_w = font.space_width(fs);
        let highlight = run.highlight.as_deref().map(&highlight_rgb);

        for (seg_idx, segment) in run.text.split('\n').enumerate() {
            if seg_idx > 0 {
                lines.push(finish_line(&mut current_chunks));
                current_x = 0.0;
                prev_ended_with_ws = false;
            }
            let starts_with_ws = segment.starts_with(|c: char| c.is_ascii_whitespace());

            for (i, word) in segment.split_ascii_whitespace().enumerate() {
                let ww = font.word_width(word, fs);

                let need_space =
                    !current_chunks.is_empty() && (i > 0 || starts_with_ws || prev_ended_with_ws);

                // Use the space width from the run that owns the space character:
                // within a run (i > 0) or leading ws → this run's space_w;
                // trailing ws from previous run → previous run's space_w
                let effective_space_w = if i > 0 || starts_with_ws {
                    space_w
                } else {
                    prev_space_w
                };

                let proposed_x = if need_space {
                    current_x + effective_space_w
                } else {
                    current_x
                };

                let line_max = if lines.is_empty() {
                    max_width + first_line_hanging
                } else {
                    max_width
                };
                if !current_chunks.is_empty() && proposed_x + ww > line_max {
                    lines.push(finish_line(&mut current_chunks));
                    current_x = 0.0;
                } else {
                    current_x = proposed_x;
                }

                current_chunks.push(WordChunk {
                    font,
                    text: word.to_string(),
                    font_size: fs,
                    color: style.color,
                    highlight,
                    x_offset: current_x,
                    width: ww,
                    underline: run.underline,
                    strikethrough: run.strike,
                });
                current_x += ww;
            }

            prev_ended_with_ws = segment.ends_with(|c: char| c.is_ascii_whitespace());
        }
        prev_space_w = space_w;
    }

    if !current_chunks.is_empty() || lines.is_empty() {
        lines.push(finish_line(&mut current_chunks));
    }
    lines
}

fn set_fill(content: &mut Content, color: Option<[u8; 3]>) {
    if let Some([r, g, b]) = color {
        content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    } else {
        content.set_fill_gray(0.0);
    }
}

/// Render pre-built lines applying the paragraph alignment. `baseline_y` is
/// in PDF space (origin bottom-left).
/// `total_line_count` is the full paragraph line count (for justify: last line stays left-aligned).
pub(super) fn render_paragraph_lines(
    content: &mut Content,
    lines: &[TextLine],
    alignment: Alignment,
    margin_left: f32,
    text_width: f32,
    baseline_y: f32,
    line_pitch: f32,
    total_line_count: usize,
    first_line_index: usize,
    first_line_hanging: f32,
) {
    let mut current_color: Option<[u8; 3]> = None;
    let mut cur_font: Option<StandardFont> = None;
    let mut cur_font_size: f32 = -1.0;

    let last_line_idx = total_line_count.saturating_sub(1);
    for (line_num, line) in lines.iter().enumerate() {
        let y = baseline_y - line_num as f32 * line_pitch;
        let global_line_idx = first_line_index + line_num;

        let is_justified = alignment == Alignment::Justify
            && global_line_idx != last_line_idx
            && line.chunks.len() > 1;

        let (eff_margin, eff_width) = if global_line_idx == 0 && first_line_hanging > 0.0 {
            (margin_left - first_line_hanging, text_width + first_line_hanging)
        } else {
            (margin_left, text_width)
        };

        let line_start_x = match alignment {
            Alignment::Center => eff_margin + (eff_width - line.total_width) / 2.0,
            Alignment::Right => eff_margin + eff_width - line.total_width,
            Alignment::Left | Alignment::Justify => eff_margin,
        };

        let extra_per_gap = if is_justified {
            (eff_width - line.total_width) / (line.chunks.len() - 1) as f32
        } else {
            0.0
        };

        let mut decorations: Vec<(f32, f32, f32, f32, Option<[u8; 3]>)> = Vec::new();

        // Draw run highlights as merged spans (contiguous same-color highlights)
        {
            let mut hl_start_x = 0.0f32;
            let mut hl_color: Option<[u8; 3]> = None;
            let mut hl_end_x = 0.0f32;
            let mut hl_fs = 0.0f32;

            let flush_hl = |content: &mut Content,
                            color: [u8; 3],
                            sx: f32,
                            ex: f32,
                            fs: f32,
                            y: f32| {
                let hl_bottom = y - fs * 0.2;
                let hl_height = fs * 1.15;
                content.save_state();
                set_fill(content, Some(color));
                content.rect(sx, hl_bottom, ex - sx, hl_height);
                content.fill_nonzero();
                content.restore_state();
            };

            for (chunk_idx, chunk) in line.chunks.iter().enumerate() {
                let x = line_start_x + chunk.x_offset + chunk_idx as f32 * extra_per_gap;
                if chunk.highlight == hl_color && hl_color.is_some() {
                    hl_end_x = x + chunk.width;
                    hl_fs = hl_fs.max(chunk.font_size);
                } else {
                    if let Some(c) = hl_color {
                        flush_hl(content, c, hl_start_x, hl_end_x, hl_fs, y);
                    }
                    if let Some(c) = chunk.highlight {
                        hl_start_x = x;
                        hl_end_x = x + chunk.width;
                        hl_fs = chunk.font_size;
                        hl_color = Some(c);
                    } else {
                        hl_color = None;
                    }
                }
            }
            if let Some(c) = hl_color {
                flush_hl(content, c, hl_start_x, hl_end_x, hl_fs, y);
            }
        }

        if line.chunks.is_empty() {
            continue;
        }

        content.begin_text();
        let mut td_x = 0.0_f32;
        let mut td_y = 0.0_f32;

        for (chunk_idx, chunk) in line.chunks.iter().enumerate() {
            let x = line_start_x + chunk.x_offset + chunk_idx as f32 * extra_per_gap;

            if chunk.color != current_color {
                set_fill(content, chunk.color);
                current_color = chunk.color;
            }

            if cur_font != Some(chunk.font) || cur_font_size != chunk.font_size {
                content.set_font(Name(chunk.font.pdf_name()), chunk.font_size);
                cur_font = Some(chunk.font);
                cur_font_size = chunk.font_size;
            }

            content.next_line(x - td_x, y - td_y);
            td_x = x;
            td_y = y;

            content.show(Str(&to_winansi_bytes(&chunk.text)));

            if chunk.underline {
                let thick = (chunk.font_size * 0.05).max(0.5);
                let ul_y = y - chunk.font_size * 0.12;
                decorations.push((x, ul_y - thick, chunk.width, thick, chunk.color));
            }
            if chunk.strikethrough {
                let thick = (chunk.font_size * 0.05).max(0.5);
                let st_y = y + chunk.font_size * 0.3;
                decorations.push((x, st_y, chunk.width, thick, chunk.color));
            }
        }
        content.end_text();

        for &(dx, dy, dw, dh, dcolor) in &decorations {
            if dcolor != current_color {
                set_fill(content, dcolor);
                current_color = dcolor;
            }
            content.rect(dx, dy, dw, dh).fill_nonzero();
        }
    }
    if current_color.is_some() {
        content.set_fill_gray(0.0);
    }
}

/// Draw one line of plain text with its left edge at `x`.
pub(super) fn show_text(
    content: &mut Content,
    font: StandardFont,
    font_size: f32,
    x: f32,
    baseline_y: f32,
    text: &str,
) {
    content.begin_text();
    content.set_font(Name(font.pdf_name()), font_size);
    content.next_line(x, baseline_y);
    content.show(Str(&to_winansi_bytes(text)));
    content.end_text();
}
