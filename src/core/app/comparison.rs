//! State for the side-by-side "your code vs. assistant output" overlay.

use crate::core::reindent::reindent_report;

pub const DEFAULT_SPLIT_PERCENT: u8 = 50;
/// Split change applied per Left/Right key press.
pub const SPLIT_STEP: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonState {
    pub visible: bool,
    /// Reindented snapshot of the last accepted draft.
    pub user_code: String,
    /// Snapshot of the latest assistant content.
    pub ai_code: String,
    /// Whether the braces in the last draft balanced out.
    pub user_code_balanced: bool,
    split_percent: u8,
}

impl Default for ComparisonState {
    fn default() -> Self {
        Self {
            visible: false,
            user_code: String::new(),
            ai_code: String::new(),
            user_code_balanced: true,
            split_percent: DEFAULT_SPLIT_PERCENT,
        }
    }
}

impl ComparisonState {
    pub fn split_percent(&self) -> u8 {
        self.split_percent
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Store `percent` clamped into `0..=100`.
    pub fn set_split(&mut self, percent: i64) {
        self.split_percent = percent.clamp(0, 100) as u8;
    }

    pub fn nudge_split(&mut self, delta: i64) {
        self.set_split(i64::from(self.split_percent) + delta);
    }

    /// Map a pointer column inside an overlay of `total` columns to a split.
    pub fn set_split_from_column(&mut self, column: u16, total: u16) {
        if total == 0 {
            return;
        }
        self.set_split(i64::from(column) * 100 / i64::from(total));
    }

    /// Widths of the left and right panes; they always sum to `total`.
    pub fn pane_widths(&self, total: u16) -> (u16, u16) {
        let left = (u32::from(total) * u32::from(self.split_percent) / 100) as u16;
        (left, total - left)
    }

    pub fn capture_user_code(&mut self, draft: &str) {
        let report = reindent_report(draft);
        self.user_code_balanced = report.is_balanced();
        self.user_code = report.output;
    }

    pub fn capture_ai_code(&mut self, content: &str) {
        if self.ai_code != content {
            self.ai_code.clear();
            self.ai_code.push_str(content);
        }
    }
}
