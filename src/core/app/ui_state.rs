use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::message::Message;
use crate::ui::layout::{Layout, LayoutConfig, LayoutEngine};
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollState;

/// How long a status notice stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(6);

/// Where the conversation is in the request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationPhase {
    #[default]
    Idle,
    /// Request sent, no response text yet.
    Submitting,
    /// At least one chunk has arrived.
    Streaming,
}

/// How the most recent response ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusNotice {
    pub text: String,
    pub kind: StatusKind,
    pub set_at: Instant,
}

struct LayoutCache {
    width: u16,
    revision: u64,
    selected_block: Option<usize>,
    layout: Layout,
}

pub struct UiState {
    pub messages: VecDeque<Message>,
    pub phase: ConversationPhase,
    pub last_outcome: Option<StreamOutcome>,
    pub scroll: ScrollState,
    pub pulse_start: Instant,
    pub status: Option<StatusNotice>,
    pub theme: Theme,
    pub markdown_enabled: bool,
    pub syntax_enabled: bool,
    pub user_display_name: String,
    pub assistant_display_name: String,
    /// Selected code block while block-select mode is active.
    pub selected_block: Option<usize>,
    pub exit_requested: bool,
    revision: u64,
    layout_cache: Option<LayoutCache>,
}

impl UiState {
    pub fn new(
        theme: Theme,
        markdown_enabled: bool,
        syntax_enabled: bool,
        user_display_name: String,
        assistant_display_name: String,
    ) -> Self {
        Self {
            messages: VecDeque::new(),
            phase: ConversationPhase::Idle,
            last_outcome: None,
            scroll: ScrollState::default(),
            pulse_start: Instant::now(),
            status: None,
            theme,
            markdown_enabled,
            syntax_enabled,
            user_display_name,
            assistant_display_name,
            selected_block: None,
            exit_requested: false,
            revision: 0,
            layout_cache: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != ConversationPhase::Idle
    }

    /// The typing indicator is shown for the whole in-flight window.
    pub fn is_typing_indicator_visible(&self) -> bool {
        self.is_busy()
    }

    pub fn begin_submitting(&mut self) {
        self.phase = ConversationPhase::Submitting;
        self.last_outcome = None;
        self.pulse_start = Instant::now();
    }

    pub fn mark_streaming(&mut self) {
        if self.phase == ConversationPhase::Submitting {
            self.phase = ConversationPhase::Streaming;
        }
    }

    pub fn end_streaming(&mut self, outcome: StreamOutcome) {
        self.phase = ConversationPhase::Idle;
        self.last_outcome = Some(outcome);
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusNotice {
            text: text.into(),
            kind: StatusKind::Info,
            set_at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusNotice {
            text: text.into(),
            kind: StatusKind::Error,
            set_at: Instant::now(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// The status notice, unless it has outlived [`STATUS_TTL`].
    pub fn visible_status(&self, now: Instant) -> Option<&StatusNotice> {
        self.status
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.set_at) < STATUS_TTL)
    }

    /// Drop a notice that has outlived its TTL. Returns whether one was dropped.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        if self.status.is_some() && self.visible_status(now).is_none() {
            self.status = None;
            return true;
        }
        false
    }

    /// Invalidate cached layout after the transcript or display flags change.
    pub fn mark_dirty(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn layout(&mut self, width: u16) -> &Layout {
        let fresh = matches!(
            &self.layout_cache,
            Some(cache) if cache.width == width
                && cache.revision == self.revision
                && cache.selected_block == self.selected_block
        );
        if !fresh {
            self.layout_cache = None;
        }
        let cache = self.layout_cache.get_or_insert_with(|| {
            let cfg = LayoutConfig {
                width: Some(width),
                markdown_enabled: self.markdown_enabled,
                syntax_enabled: self.syntax_enabled,
                user_display_name: &self.user_display_name,
                assistant_display_name: &self.assistant_display_name,
                selected_block: self.selected_block,
            };
            LayoutCache {
                width,
                revision: self.revision,
                selected_block: self.selected_block,
                layout: LayoutEngine::layout_messages(&self.messages, &self.theme, &cfg),
            }
        });
        &cache.layout
    }

    pub fn line_count(&mut self, width: u16) -> u16 {
        self.layout(width).line_count()
    }

    /// Apply auto-scroll for the current transcript size.
    pub fn follow_transcript(&mut self, viewport: u16, width: u16) {
        let total = self.line_count(width);
        self.scroll.follow(total, viewport);
    }

    /// Follow the transcript after an append that started from
    /// `total_before` lines.
    pub fn follow_appended(&mut self, total_before: u16, viewport: u16, width: u16) {
        let total = self.line_count(width);
        self.scroll.follow_growth(total_before, total, viewport);
    }

    pub fn code_block_count(&mut self, width: u16) -> usize {
        self.layout(width).code_blocks.len()
    }

    pub fn in_block_select_mode(&self) -> bool {
        self.selected_block.is_some()
    }

    pub fn exit_block_select_mode(&mut self) {
        self.selected_block = None;
    }
}
