use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Rows from the bottom that still count as "at the bottom" for auto-scroll.
pub const NEAR_BOTTOM_SLACK: u16 = 1;

/// Viewport position over the prewrapped transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub offset: u16,
    pub auto_scroll: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            auto_scroll: true,
        }
    }
}

impl ScrollState {
    /// Largest offset that still fills the viewport.
    pub fn max_offset(total_lines: u16, viewport: u16) -> u16 {
        total_lines.saturating_sub(viewport)
    }

    /// Offset that shows the last line of the transcript.
    pub fn scroll_to_end(total_lines: u16, viewport: u16) -> u16 {
        Self::max_offset(total_lines, viewport)
    }

    pub fn is_near_bottom(&self, total_lines: u16, viewport: u16) -> bool {
        let max = Self::max_offset(total_lines, viewport);
        self.offset.saturating_add(NEAR_BOTTOM_SLACK) >= max
    }

    /// Follow new content only while auto-scroll is armed.
    pub fn follow(&mut self, total_lines: u16, viewport: u16) {
        if self.auto_scroll {
            self.offset = Self::scroll_to_end(total_lines, viewport);
        } else {
            self.offset = self.offset.min(Self::max_offset(total_lines, viewport));
        }
    }

    /// Follow content that grew from `total_before` lines. A viewport that
    /// was at or near the bottom before the growth re-arms auto-scroll.
    pub fn follow_growth(&mut self, total_before: u16, total_lines: u16, viewport: u16) {
        if self.is_near_bottom(total_before, viewport) {
            self.auto_scroll = true;
        }
        self.follow(total_lines, viewport);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
        self.auto_scroll = false;
    }

    /// Scrolling back down to the last line re-arms auto-scroll.
    pub fn scroll_down(&mut self, lines: u16, total_lines: u16, viewport: u16) {
        let max = Self::max_offset(total_lines, viewport);
        self.offset = self.offset.saturating_add(lines).min(max);
        self.auto_scroll = self.offset >= max;
    }

    pub fn page_up(&mut self, viewport: u16) {
        self.scroll_up(viewport.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self, total_lines: u16, viewport: u16) {
        self.scroll_down(viewport.saturating_sub(1).max(1), total_lines, viewport);
    }

    pub fn jump_to_end(&mut self, total_lines: u16, viewport: u16) {
        self.offset = Self::scroll_to_end(total_lines, viewport);
        self.auto_scroll = true;
    }
}

/// Pre-wrap styled lines to `width` columns at word boundaries, breaking
/// tokens longer than the width. Rendering uses the result without ratatui's
/// own wrapping so that line counts match what is on screen.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if width == 0 || line.spans.is_empty() {
            out.push(owned_line(line));
            continue;
        }
        wrap_one(line, width, &mut out);
    }
    out
}

fn owned_line(line: &Line<'_>) -> Line<'static> {
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|s| Span::styled(s.content.to_string(), s.style))
        .collect();
    with_layout_of(Line::from(spans), line)
}

fn with_layout_of(mut line: Line<'static>, template: &Line<'_>) -> Line<'static> {
    line.style = template.style;
    line.alignment = template.alignment;
    line
}

struct LineBuilder<'a> {
    out: &'a mut Vec<Line<'static>>,
    template: &'a Line<'a>,
    spans: Vec<Span<'static>>,
    width: usize,
}

impl LineBuilder<'_> {
    fn push(&mut self, style: Style, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if last.style == style {
                last.content.to_mut().push_str(text);
                return;
            }
        }
        self.spans.push(Span::styled(text.to_string(), style));
    }

    fn emit(&mut self) {
        let spans = std::mem::take(&mut self.spans);
        self.out
            .push(with_layout_of(Line::from(spans), self.template));
        self.width = 0;
    }
}

fn wrap_one(line: &Line<'_>, width: usize, out: &mut Vec<Line<'static>>) {
    // Split into (text, style, is_space) tokens so words can move as a unit.
    let mut tokens: Vec<(String, Style, bool)> = Vec::new();
    for span in &line.spans {
        for ch in span.content.chars() {
            let is_space = ch == ' ';
            match tokens.last_mut() {
                Some((text, style, space)) if *space == is_space && *style == span.style => {
                    text.push(ch)
                }
                _ => tokens.push((ch.to_string(), span.style, is_space)),
            }
        }
    }

    let start = out.len();
    let mut builder = LineBuilder {
        out,
        template: line,
        spans: Vec::new(),
        width: 0,
    };

    let mut i = 0;
    while i < tokens.len() {
        let (text, style, is_space) = &tokens[i];
        if *is_space {
            for _ in text.chars() {
                if builder.width >= width {
                    builder.emit();
                    // Leading spaces on a continuation row are dropped.
                    break;
                }
                builder.push(*style, " ");
                builder.width += 1;
            }
            i += 1;
            continue;
        }

        // Gather a whole word that may span several styled tokens.
        let mut j = i;
        let mut word_width = 0;
        while j < tokens.len() && !tokens[j].2 {
            word_width += str_width(&tokens[j].0);
            j += 1;
        }
        if builder.width > 0 && builder.width + word_width > width {
            builder.emit();
        }
        for (text, style, _) in &tokens[i..j] {
            for ch in text.chars() {
                let w = ch.width().unwrap_or(0);
                if builder.width + w > width && builder.width > 0 {
                    builder.emit();
                }
                let mut buf = [0u8; 4];
                builder.push(*style, ch.encode_utf8(&mut buf));
                builder.width += w;
            }
        }
        i = j;
    }

    if !builder.spans.is_empty() || builder.out.len() == start {
        builder.emit();
    }
}

fn str_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn follow_sticks_to_bottom_while_armed() {
        let mut state = ScrollState::default();
        state.follow(30, 10);
        assert_eq!(state.offset, 20);
        state.follow(5, 10);
        assert_eq!(state.offset, 0);
    }

    #[test]
    fn scrolling_up_disarms_and_returning_rearms() {
        let mut state = ScrollState::default();
        state.follow(30, 10);
        state.scroll_up(3);
        assert!(!state.auto_scroll);
        state.follow(40, 10);
        assert_eq!(state.offset, 17);
        state.scroll_down(100, 40, 10);
        assert_eq!(state.offset, 30);
        assert!(state.auto_scroll);
    }

    #[test]
    fn near_bottom_allows_one_line_of_slack() {
        let state = ScrollState {
            offset: 19,
            auto_scroll: false,
        };
        assert!(state.is_near_bottom(30, 10));
        assert!(!ScrollState {
            offset: 10,
            auto_scroll: false
        }
        .is_near_bottom(30, 10));
    }

    #[test]
    fn growth_follows_when_previously_near_bottom() {
        let mut state = ScrollState {
            offset: 19,
            auto_scroll: false,
        };
        state.follow_growth(30, 45, 10);
        assert_eq!(state.offset, 35);
        assert!(state.auto_scroll);

        let mut far = ScrollState {
            offset: 5,
            auto_scroll: false,
        };
        far.follow_growth(30, 45, 10);
        assert_eq!(far.offset, 5);
        assert!(!far.auto_scroll);
    }

    #[test]
    fn page_moves_by_viewport_minus_overlap() {
        let mut state = ScrollState {
            offset: 20,
            auto_scroll: true,
        };
        state.page_up(10);
        assert_eq!(state.offset, 11);
        state.page_down(30, 10);
        assert_eq!(state.offset, 20);
        assert!(state.auto_scroll);
    }

    #[test]
    fn prewrap_breaks_at_word_boundaries() {
        let lines = vec![Line::from("hello brave new world")];
        let wrapped = prewrap_lines(&lines, 11);
        assert_eq!(plain(&wrapped), vec!["hello brave", "new world"]);
    }

    #[test]
    fn prewrap_chunks_long_words_and_keeps_empty_lines() {
        let lines = vec![Line::from("abcdefghij"), Line::from("")];
        let wrapped = prewrap_lines(&lines, 4);
        assert_eq!(plain(&wrapped), vec!["abcd", "efgh", "ij", ""]);
    }

    #[test]
    fn prewrap_preserves_styles_across_spans() {
        let bold = Style::default().add_modifier(ratatui::style::Modifier::BOLD);
        let lines = vec![Line::from(vec![
            Span::raw("see "),
            Span::styled("this", bold),
        ])];
        let wrapped = prewrap_lines(&lines, 40);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].spans[1].style, bold);
    }
}
