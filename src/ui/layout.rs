use std::collections::VecDeque;

use ratatui::layout::Rect;
use ratatui::text::Line;
use unicode_width::UnicodeWidthStr;

use super::markdown::{render_message_with_config, CopyTarget, MessageRenderConfig};
use super::theme::Theme;
use crate::core::message::Message;
use crate::utils::scroll::prewrap_lines;

/// Tallest the input box grows before it scrolls internally.
pub const MAX_INPUT_ROWS: u16 = 6;

/// Layout configuration used by the layout engine.
#[derive(Clone, Debug)]
pub struct LayoutConfig<'a> {
    pub width: Option<u16>,
    pub markdown_enabled: bool,
    pub syntax_enabled: bool,
    pub user_display_name: &'a str,
    pub assistant_display_name: &'a str,
    /// Index into [`Layout::code_blocks`] to highlight, if any.
    pub selected_block: Option<usize>,
}

/// A copyable code block located in the flattened, wrapped line stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlockLocation {
    pub start: usize,
    pub len: usize,
    pub copy: CopyTarget,
}

/// Result of a layout pass: wrapped lines plus where each copyable code
/// block landed.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub lines: Vec<Line<'static>>,
    pub code_blocks: Vec<CodeBlockLocation>,
}

impl Layout {
    pub fn line_count(&self) -> u16 {
        self.lines.len().min(u16::MAX as usize) as u16
    }
}

pub struct LayoutEngine;

impl LayoutEngine {
    /// Lay out the transcript. Empty assistant messages (a response that has
    /// not produced text yet) are skipped; the typing indicator stands in.
    pub fn layout_messages(
        messages: &VecDeque<Message>,
        theme: &Theme,
        cfg: &LayoutConfig<'_>,
    ) -> Layout {
        let render_cfg = MessageRenderConfig::markdown(cfg.markdown_enabled, cfg.syntax_enabled)
            .with_display_names(cfg.user_display_name, cfg.assistant_display_name);

        let mut layout = Layout::default();
        for msg in messages {
            if msg.is_assistant() && msg.content.is_empty() {
                continue;
            }

            let rendered = render_message_with_config(msg, theme, &render_cfg);

            // Wrap line by line so code block ranges can be remapped.
            let mut wrapped_starts = Vec::with_capacity(rendered.lines.len() + 1);
            for line in &rendered.lines {
                wrapped_starts.push(layout.lines.len());
                let width = cfg.width.unwrap_or(0);
                layout
                    .lines
                    .extend(prewrap_lines(std::slice::from_ref(line), width));
            }
            wrapped_starts.push(layout.lines.len());

            for block in rendered.code_blocks {
                let block_start = wrapped_starts[block.start];
                let block_end = wrapped_starts[block.start + block.len];
                layout.code_blocks.push(CodeBlockLocation {
                    start: block_start,
                    len: block_end - block_start,
                    copy: block.copy,
                });
            }
        }

        if let Some(selected) = cfg.selected_block.and_then(|i| layout.code_blocks.get(i)) {
            let range = selected.start..selected.start + selected.len;
            for line in &mut layout.lines[range] {
                for span in &mut line.spans {
                    span.style = span.style.patch(theme.selection_style);
                }
            }
        }

        layout
    }
}

/// Rows needed to show `lines` inside an input box `width` columns wide
/// (borders included in `width`, excluded from the result).
pub fn input_area_height(lines: &[String], width: u16) -> u16 {
    let inner = width.saturating_sub(2).max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|line| {
            let w = UnicodeWidthStr::width(line.as_str());
            // The cursor may sit one past the last character.
            (w / inner) + 1
        })
        .sum();
    (rows.max(1).min(MAX_INPUT_ROWS as usize)) as u16
}

/// Area the comparison overlay occupies inside the chat area.
pub fn overlay_area(area: Rect) -> Rect {
    let width = (area.width as u32 * 9 / 10) as u16;
    let height = (area.height as u32 * 8 / 10) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
