use super::comparison::ComparisonState;
use super::{session::SessionContext, ui_state::UiState};
use crate::api::ChatMessage;
use crate::core::message::Message;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Sole writer of the transcript. Borrows the pieces of [`super::App`] a
/// conversation step touches.
pub struct ConversationController<'a> {
    session: &'a mut SessionContext,
    ui: &'a mut UiState,
    comparison: &'a mut ComparisonState,
}

impl<'a> ConversationController<'a> {
    pub fn new(
        session: &'a mut SessionContext,
        ui: &'a mut UiState,
        comparison: &'a mut ComparisonState,
    ) -> Self {
        Self {
            session,
            ui,
            comparison,
        }
    }

    /// Append the user's message plus an empty assistant placeholder and
    /// return the history to send, placeholder excluded.
    pub fn add_user_message(&mut self, content: String) -> Vec<ChatMessage> {
        self.ui.clear_status();
        self.ui.messages.push_back(Message::user(content));
        self.ui.messages.push_back(Message::assistant(String::new()));
        self.ui.mark_dirty();

        self.ui
            .messages
            .iter()
            .take(self.ui.messages.len() - 1)
            .filter(|msg| !msg.content.is_empty())
            .map(ChatMessage::from)
            .collect()
    }

    pub fn set_status<S: Into<String>>(&mut self, s: S) {
        self.ui.set_status(s);
    }

    pub fn set_error<S: Into<String>>(&mut self, s: S) {
        self.ui.set_error(s);
    }

    pub fn clear_status(&mut self) {
        self.ui.clear_status();
    }

    /// Grow the trailing assistant message and keep the viewport pinned to
    /// the bottom when the user had not scrolled away.
    pub fn append_to_response(
        &mut self,
        content: &str,
        available_height: u16,
        terminal_width: u16,
    ) {
        if !self.ui.messages.back().is_some_and(|m| m.is_assistant()) {
            return;
        }
        let total_before = self.ui.line_count(terminal_width);
        let Some(last_msg) = self.ui.messages.back_mut() else {
            return;
        };
        last_msg.content.push_str(content);
        self.comparison.capture_ai_code(&last_msg.content);
        self.ui.mark_streaming();
        self.ui.mark_dirty();
        self.ui
            .follow_appended(total_before, available_height, terminal_width);
    }

    pub fn update_scroll_position(&mut self, available_height: u16, terminal_width: u16) {
        self.ui
            .follow_transcript(available_height, terminal_width);
    }

    pub fn calculate_available_height(&self, term_height: u16, input_area_height: u16) -> u16 {
        term_height
            .saturating_sub(input_area_height + 2)
            .saturating_sub(1)
    }

    /// Snapshot the final assistant text for the comparison overlay.
    pub fn finalize_response(&mut self) {
        if let Some(last_msg) = self.ui.messages.back() {
            if last_msg.is_assistant() {
                self.comparison.capture_ai_code(&last_msg.content);
                debug!(
                    stream_id = self.session.current_stream_id,
                    chars = last_msg.content.len(),
                    "Response finalized"
                );
            }
        }
    }

    /// Drop assistant placeholders that never received text.
    pub fn remove_trailing_empty_assistant_messages(&mut self) {
        let mut removed = false;
        while matches!(
            self.ui.messages.back(),
            Some(msg) if msg.is_assistant() && msg.content.is_empty()
        ) {
            self.ui.messages.pop_back();
            removed = true;
        }
        if removed {
            self.ui.mark_dirty();
        }
    }

    pub fn cancel_current_stream(&mut self) {
        if let Some(token) = self.session.stream_cancel_token.take() {
            token.cancel();
            debug!(
                stream_id = self.session.current_stream_id,
                "Cancelled in-flight stream"
            );
        }
    }

    pub fn start_new_stream(&mut self) -> (CancellationToken, u64) {
        self.cancel_current_stream();

        self.session.current_stream_id += 1;

        let token = CancellationToken::new();
        self.session.stream_cancel_token = Some(token.clone());
        self.ui.begin_submitting();

        (token, self.session.current_stream_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::app::ui_state::ConversationPhase;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn add_user_message_appends_placeholder_and_excludes_it_from_history() {
        let mut app = create_test_app();
        let api_messages = app.conversation().add_user_message("hello".into());
        assert_eq!(app.ui.messages.len(), 2);
        assert!(app.ui.messages[1].is_assistant());
        assert!(app.ui.messages[1].content.is_empty());
        assert_eq!(api_messages.len(), 1);
        assert_eq!(api_messages[0].role, "user");
        assert_eq!(api_messages[0].content, "hello");
    }

    #[test]
    fn history_skips_empty_assistant_turns() {
        let mut app = create_test_app();
        app.ui.messages.push_back(crate::core::message::Message::user("first"));
        app.ui
            .messages
            .push_back(crate::core::message::Message::assistant(""));
        let api_messages = app.conversation().add_user_message("second".into());
        let contents: Vec<&str> = api_messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn append_grows_last_assistant_message_and_snapshots_it() {
        let mut app = create_test_app();
        app.conversation().add_user_message("hi".into());
        app.conversation().start_new_stream();
        app.conversation().append_to_response("Hel", 20, 80);
        app.conversation().append_to_response("lo", 20, 80);
        assert_eq!(app.ui.messages.back().map(|m| m.content.as_str()), Some("Hello"));
        assert_eq!(app.comparison.ai_code, "Hello");
        assert_eq!(app.ui.phase, ConversationPhase::Streaming);
    }

    #[test]
    fn append_follows_bottom_when_auto_scroll_is_armed() {
        let mut app = create_test_app();
        app.conversation().add_user_message("hi".into());
        let long = "line\n\n".repeat(40);
        app.conversation().append_to_response(&long, 10, 80);
        let total = app.ui.line_count(80);
        assert!(total > 10);
        assert_eq!(app.ui.scroll.offset, total - 10);
    }

    #[test]
    fn append_does_not_move_viewport_after_user_scrolls_up() {
        let mut app = create_test_app();
        app.conversation().add_user_message("hi".into());
        let long = "line\n\n".repeat(40);
        app.conversation().append_to_response(&long, 10, 80);
        app.ui.scroll.scroll_up(15);
        let pinned = app.ui.scroll.offset;
        app.conversation().append_to_response("more\n\nmore", 10, 80);
        assert_eq!(app.ui.scroll.offset, pinned);
    }

    #[test]
    fn append_re_arms_follow_when_viewport_is_one_line_from_bottom() {
        let mut app = create_test_app();
        app.conversation().add_user_message("hi".into());
        let long = "line\n\n".repeat(40);
        app.conversation().append_to_response(&long, 10, 80);
        app.ui.scroll.scroll_up(1);
        assert!(!app.ui.scroll.auto_scroll);

        app.conversation().append_to_response("more\n\nmore", 10, 80);
        let total = app.ui.line_count(80);
        assert_eq!(app.ui.scroll.offset, total - 10);
        assert!(app.ui.scroll.auto_scroll);
    }

    #[test]
    fn start_new_stream_cancels_previous_token() {
        let mut app = create_test_app();
        let (first, first_id) = app.conversation().start_new_stream();
        let (second, second_id) = app.conversation().start_new_stream();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(second_id, first_id + 1);
        assert_eq!(app.ui.phase, ConversationPhase::Submitting);
    }

    #[test]
    fn remove_trailing_empty_assistant_keeps_partial_content() {
        let mut app = create_test_app();
        app.conversation().add_user_message("hi".into());
        app.conversation().remove_trailing_empty_assistant_messages();
        assert_eq!(app.ui.messages.len(), 1);

        app.conversation().add_user_message("again".into());
        app.conversation().append_to_response("partial", 20, 80);
        app.conversation().remove_trailing_empty_assistant_messages();
        assert_eq!(app.ui.messages.len(), 3);
    }

    #[test]
    fn available_height_reserves_input_and_title() {
        let mut app = create_test_app();
        assert_eq!(app.conversation().calculate_available_height(24, 1), 20);
        assert_eq!(app.conversation().calculate_available_height(2, 5), 0);
    }
}
