use std::time::{Duration, Instant};

use crate::core::app::ui_state::StatusKind;
use crate::core::app::App;
use crate::ui::layout::overlay_area;
use crate::utils::scroll::ScrollState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const INPUT_TITLE: &str = "Message (Enter send, Alt+Enter newline, Ctrl+D compare, Ctrl+B blocks)";
const INPUT_TITLE_STREAMING: &str = "Message (Esc to stop)";
const INPUT_TITLE_BLOCK_SELECT: &str = "Select block (Up/Down move, c or Enter copy, Esc done)";
const USER_PANE_TITLE: &str = "Your code (reindented)";
const ASSISTANT_PANE_TITLE: &str = "Assistant";

/// Frame of the typing indicator for the time since the request started.
pub fn pulse_symbol(elapsed: Duration) -> &'static str {
    let phase = (elapsed.as_millis() % 1000) as f32 / 500.0;
    let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
    if intensity < 0.33 {
        "○"
    } else if intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

/// Split the terminal into transcript and input areas.
pub fn split_areas(area: Rect, input_rows: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(input_rows + 2)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Interior of the comparison overlay (inside its border) for a terminal of
/// the given size. Pointer columns are measured against this rectangle.
pub fn overlay_inner_area(area: Rect, input_rows: u16) -> Rect {
    let (chat_area, _) = split_areas(area, input_rows);
    Block::default()
        .borders(Borders::ALL)
        .inner(overlay_area(chat_area))
}

fn title_line(app: &App, now: Instant) -> Line<'static> {
    let theme = &app.ui.theme;
    let mut spans = vec![Span::styled(
        format!(
            "Linga v{} - {}",
            env!("CARGO_PKG_VERSION"),
            app.session.model
        ),
        theme.title_style,
    )];
    if let Some(notice) = app.ui.visible_status(now) {
        let style = match notice.kind {
            StatusKind::Info => theme.status_style,
            StatusKind::Error => theme.error_style,
        };
        spans.push(Span::styled("  •  ", theme.title_style));
        spans.push(Span::styled(notice.text.clone(), style));
    }
    Line::from(spans)
}

fn input_title(app: &App) -> &'static str {
    if app.ui.in_block_select_mode() {
        INPUT_TITLE_BLOCK_SELECT
    } else if app.ui.is_busy() {
        INPUT_TITLE_STREAMING
    } else {
        INPUT_TITLE
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let now = Instant::now();
    let area = f.area();
    let input_rows = app.input_area_height(area.width);
    let (chat_area, input_area) = split_areas(area, input_rows);

    let title = title_line(app, now);
    let available_height = chat_area.height.saturating_sub(1);
    let theme_bg = app.ui.theme.background_color;

    let layout = app.ui.layout(chat_area.width);
    let total = layout.line_count();
    let lines = layout.lines.clone();
    let scroll_offset = app
        .ui
        .scroll
        .offset
        .min(ScrollState::max_offset(total, available_height));

    let transcript = Paragraph::new(lines)
        .style(Style::default().bg(theme_bg))
        .block(Block::default().title(title))
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chat_area);

    render_input(f, app, input_area, now);

    if app.comparison.visible {
        render_comparison(f, app, chat_area);
    }
}

fn render_input(f: &mut Frame, app: &App, area: Rect, now: Instant) {
    let theme = &app.ui.theme;
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .title(Span::styled(input_title(app), theme.input_title_style));
    if app.ui.is_typing_indicator_visible() {
        let symbol = pulse_symbol(now.saturating_duration_since(app.ui.pulse_start));
        block = block.title_top(
            Line::from(Span::styled(
                format!(" {symbol} "),
                theme.streaming_indicator_style,
            ))
            .right_aligned(),
        );
    }
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(app.composer.textarea(), inner);
}

fn render_comparison(f: &mut Frame, app: &App, chat_area: Rect) {
    let theme = &app.ui.theme;
    let area = overlay_area(chat_area);
    f.render_widget(Clear, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.overlay_border_style)
        .style(Style::default().bg(theme.background_color))
        .title(Span::styled(
            format!(
                "Compare {}% | {}% (Left/Right resize, Esc close)",
                app.comparison.split_percent(),
                100 - app.comparison.split_percent()
            ),
            theme.overlay_title_style,
        ));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let (left_width, right_width) = app.comparison.pane_widths(inner.width);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(left_width), Constraint::Length(right_width)])
        .split(inner);

    let user_title = if app.comparison.user_code_balanced {
        USER_PANE_TITLE.to_string()
    } else {
        format!("{USER_PANE_TITLE} - unbalanced braces")
    };
    render_pane(f, app, panes[0], user_title, &app.comparison.user_code);
    render_pane(
        f,
        app,
        panes[1],
        ASSISTANT_PANE_TITLE.to_string(),
        &app.comparison.ai_code,
    );
}

fn render_pane(f: &mut Frame, app: &App, area: Rect, title: String, body: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let theme = &app.ui.theme;
    let pane = Paragraph::new(body.to_string())
        .style(theme.md_codeblock_text_style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.overlay_border_style)
                .title(Span::styled(title, theme.overlay_title_style)),
        );
    f.render_widget(pane, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use crate::utils::test_utils::{create_test_app, create_test_messages};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|f| ui(f, app)).expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn pulse_cycles_through_frames() {
        assert_eq!(pulse_symbol(Duration::from_millis(0)), "○");
        assert_eq!(pulse_symbol(Duration::from_millis(250)), "◐");
        assert_eq!(pulse_symbol(Duration::from_millis(500)), "●");
        assert_eq!(pulse_symbol(Duration::from_millis(1000)), "○");
    }

    #[test]
    fn transcript_and_input_are_drawn() {
        let mut app = create_test_app();
        app.ui.messages = create_test_messages();
        app.ui.mark_dirty();
        let screen = draw(&mut app, 80, 40);
        assert!(screen.contains("Linga v"));
        assert!(screen.contains("Glad to help."));
        assert!(screen.contains("rust [copy]"));
        assert!(screen.contains(INPUT_TITLE));
    }

    #[test]
    fn indicator_shows_only_while_busy() {
        let mut app = create_test_app();
        let idle = draw(&mut app, 100, 12);
        assert!(!idle.contains(INPUT_TITLE_STREAMING));

        app.conversation().start_new_stream();
        let busy = draw(&mut app, 100, 12);
        assert!(busy.contains(INPUT_TITLE_STREAMING));
        assert!(["○", "◐", "●"].iter().any(|s| busy.contains(s)));
    }

    #[test]
    fn status_notice_appears_in_title() {
        let mut app = create_test_app();
        app.ui.set_error("API error: quota");
        let screen = draw(&mut app, 100, 12);
        assert!(screen.contains("API error: quota"));
    }

    #[test]
    fn overlay_renders_both_panes_when_visible() {
        let mut app = create_test_app();
        app.comparison.capture_user_code("{a;}");
        app.comparison.capture_ai_code("fn main() {}");
        let hidden = draw(&mut app, 100, 30);
        assert!(!hidden.contains(USER_PANE_TITLE));

        app.comparison.toggle_visible();
        let shown = draw(&mut app, 100, 30);
        assert!(shown.contains(USER_PANE_TITLE));
        assert!(shown.contains(ASSISTANT_PANE_TITLE));
        assert!(shown.contains("fn main() {}"));
        assert!(shown.contains("Compare 50% | 50%"));
    }

    #[test]
    fn overlay_flags_unbalanced_input() {
        let mut app = create_test_app();
        app.comparison.capture_user_code("{ open");
        app.comparison.toggle_visible();
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("unbalanced braces"));
    }

    #[test]
    fn overlay_inner_area_sits_inside_chat_area() {
        let area = Rect::new(0, 0, 100, 30);
        let inner = overlay_inner_area(area, 1);
        let (chat, _) = split_areas(area, 1);
        assert!(inner.x > chat.x && inner.right() < chat.right());
        assert!(inner.y > chat.y && inner.bottom() < chat.bottom());
    }

    #[test]
    fn user_message_header_is_right_aligned() {
        let mut app = create_test_app();
        app.ui.messages.push_back(Message::user("hi"));
        app.ui.mark_dirty();
        let screen = draw(&mut app, 60, 10);
        let row = screen.lines().find(|l| l.contains("You")).expect("header");
        assert!(row.trim_end().len() > 40);
    }
}
