use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{Input as TAInput, TextArea};

use crate::ui::layout::input_area_height;
use crate::ui::theme::Theme;

/// Why a submit attempt was turned away. Both are silent no-ops for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Draft is empty or whitespace only.
    Empty,
    /// A response is still in flight.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerKey {
    Submit,
    Edited,
    Ignored,
}

/// Input form state: the draft being typed and the in-flight flags.
pub struct ComposerState {
    textarea: TextArea<'static>,
    pub is_submitting: bool,
    pub is_cancelled: bool,
}

impl Default for ComposerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposerState {
    pub fn new() -> Self {
        Self {
            textarea: TextArea::default(),
            is_submitting: false,
            is_cancelled: false,
        }
    }

    pub fn configure(&mut self, theme: &Theme) {
        self.textarea
            .set_style(theme.input_text_style.bg(theme.background_color));
        self.textarea.set_cursor_style(theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(ratatui::style::Style::default());
        self.textarea
            .set_placeholder_text("Type a message (Enter to send, Alt+Enter for newline)");
        self.textarea.set_placeholder_style(theme.placeholder_style);
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn draft(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.textarea.lines().iter().all(|line| line.is_empty())
    }

    pub fn set_draft(&mut self, text: &str) {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let mut textarea = TextArea::new(lines);
        textarea.set_style(self.textarea.style());
        textarea.set_cursor_style(self.textarea.cursor_style());
        textarea.set_cursor_line_style(self.textarea.cursor_line_style());
        textarea.set_placeholder_text(self.textarea.placeholder_text());
        if let Some(style) = self.textarea.placeholder_style() {
            textarea.set_placeholder_style(style);
        }
        textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        self.textarea = textarea;
    }

    pub fn clear(&mut self) {
        self.set_draft("");
    }

    /// Accept the draft for sending. On success the draft is cleared and the
    /// composer stays busy until [`ComposerState::finish`] is called.
    pub fn submit(&mut self) -> Result<String, SubmitRejection> {
        if self.is_submitting {
            return Err(SubmitRejection::Busy);
        }
        let draft = self.draft();
        if draft.trim().is_empty() {
            return Err(SubmitRejection::Empty);
        }
        self.clear();
        self.is_submitting = true;
        self.is_cancelled = false;
        Ok(draft)
    }

    pub fn finish(&mut self) {
        self.is_submitting = false;
    }

    pub fn cancel(&mut self) {
        self.is_submitting = false;
        self.is_cancelled = true;
    }

    /// Feed a key into the draft. Plain Enter submits; Enter with Alt or Shift
    /// inserts a line break.
    pub fn handle_key(&mut self, key: &KeyEvent) -> ComposerKey {
        match key.code {
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
            {
                self.textarea.insert_newline();
                ComposerKey::Edited
            }
            KeyCode::Enter if key.modifiers.is_empty() => ComposerKey::Submit,
            KeyCode::Enter => ComposerKey::Ignored,
            _ => {
                if self.textarea.input(TAInput::from(*key)) {
                    ComposerKey::Edited
                } else {
                    ComposerKey::Ignored
                }
            }
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.textarea.insert_str(normalized);
    }

    pub fn area_height(&self, width: u16) -> u16 {
        input_area_height(self.textarea.lines(), width)
    }
}
