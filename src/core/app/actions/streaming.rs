use tracing::{debug, warn};

use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::app::composer::SubmitRejection;
use crate::core::app::ui_state::StreamOutcome;

pub(super) fn handle_streaming_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::AppendResponseChunk { content, stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            append_response_chunk(app, &content, ctx);
            None
        }
        AppAction::StreamErrored { message, stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            handle_stream_error(app, message, ctx);
            None
        }
        AppAction::StreamCompleted { stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            finalize_stream(app, ctx);
            None
        }
        AppAction::SubmitDraft => submit_draft(app, ctx),
        AppAction::CancelStreaming => {
            cancel_streaming(app, ctx);
            None
        }
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

fn submit_draft(app: &mut App, ctx: AppActionContext) -> Option<AppCommand> {
    match app.composer.submit() {
        Ok(draft) => spawn_stream_for_message(app, draft, ctx),
        Err(SubmitRejection::Empty) => None,
        Err(SubmitRejection::Busy) => {
            debug!("Submit ignored while a response is in flight");
            None
        }
    }
}

pub(super) fn spawn_stream_for_message(
    app: &mut App,
    message: String,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    app.comparison.capture_user_code(&message);
    app.ui.exit_block_select_mode();
    app.ui.scroll.auto_scroll = true;

    let available_height = app.transcript_height(ctx.term_width, ctx.term_height);
    let (api_messages, cancel_token, stream_id) = {
        let mut conversation = app.conversation();
        let api_messages = conversation.add_user_message(message);
        let (cancel_token, stream_id) = conversation.start_new_stream();
        conversation.update_scroll_position(available_height, ctx.term_width);
        (api_messages, cancel_token, stream_id)
    };

    debug!(stream_id, history = api_messages.len(), "Submitting message");
    Some(AppCommand::SpawnStream(app.build_stream_params(
        api_messages,
        cancel_token,
        stream_id,
    )))
}

fn append_response_chunk(app: &mut App, chunk: &str, ctx: AppActionContext) {
    let available_height = app.transcript_height(ctx.term_width, ctx.term_height);
    app.conversation()
        .append_to_response(chunk, available_height, ctx.term_width);
}

fn handle_stream_error(app: &mut App, message: String, ctx: AppActionContext) {
    let error_message = message.trim().to_string();
    warn!(
        stream_id = app.session.current_stream_id,
        error = %error_message,
        "Response stream failed"
    );

    let available_height = app.transcript_height(ctx.term_width, ctx.term_height);
    {
        let mut conversation = app.conversation();
        conversation.remove_trailing_empty_assistant_messages();
        conversation.finalize_response();
        conversation.set_error(error_message);
        conversation.update_scroll_position(available_height, ctx.term_width);
    }
    app.session.stream_cancel_token = None;
    app.ui.end_streaming(StreamOutcome::Failed);
    app.composer.finish();
}

fn finalize_stream(app: &mut App, ctx: AppActionContext) {
    let available_height = app.transcript_height(ctx.term_width, ctx.term_height);
    {
        let mut conversation = app.conversation();
        conversation.remove_trailing_empty_assistant_messages();
        conversation.finalize_response();
        conversation.update_scroll_position(available_height, ctx.term_width);
    }
    app.session.stream_cancel_token = None;
    app.ui.end_streaming(StreamOutcome::Completed);
    app.composer.finish();
}

/// Stop generating. Local state settles immediately; whatever text already
/// arrived stays as the final assistant message.
fn cancel_streaming(app: &mut App, ctx: AppActionContext) {
    if !app.ui.is_busy() {
        return;
    }
    let available_height = app.transcript_height(ctx.term_width, ctx.term_height);
    {
        let mut conversation = app.conversation();
        conversation.cancel_current_stream();
        conversation.remove_trailing_empty_assistant_messages();
        conversation.finalize_response();
        conversation.set_status("Response stopped");
        conversation.update_scroll_position(available_height, ctx.term_width);
    }
    app.ui.end_streaming(StreamOutcome::Cancelled);
    app.composer.cancel();
}

#[cfg(test)]
mod tests {
    use crate::core::app::actions::{apply_action, AppAction, AppActionContext, AppCommand};
    use crate::core::app::ui_state::{ConversationPhase, StatusKind, StreamOutcome};
    use crate::core::app::App;
    use crate::utils::test_utils::create_test_app;

    fn default_ctx() -> AppActionContext {
        AppActionContext {
            term_width: 80,
            term_height: 24,
        }
    }

    fn submit(app: &mut App, text: &str) -> Option<u64> {
        app.composer.set_draft(text);
        match apply_action(app, AppAction::SubmitDraft, default_ctx()) {
            Some(AppCommand::SpawnStream(params)) => Some(params.stream_id),
            _ => None,
        }
    }

    fn chunk(app: &mut App, content: &str, stream_id: u64) {
        apply_action(
            app,
            AppAction::AppendResponseChunk {
                content: content.into(),
                stream_id,
            },
            default_ctx(),
        );
    }

    #[test]
    fn blank_drafts_are_rejected_without_side_effects() {
        let mut app = create_test_app();
        assert!(submit(&mut app, "").is_none());
        assert!(submit(&mut app, "   \n  ").is_none());
        assert!(app.ui.messages.is_empty());
        assert!(app.comparison.user_code.is_empty());
        assert_eq!(app.ui.phase, ConversationPhase::Idle);
        assert!(!app.composer.is_submitting);
    }

    #[test]
    fn accepted_submit_appends_user_message_and_snapshots_reindented_code() {
        let mut app = create_test_app();
        let stream_id = submit(&mut app, "{a;}").expect("stream");
        assert_eq!(stream_id, 1);
        assert_eq!(app.ui.messages[0].content, "{a;}");
        assert!(app.ui.messages[0].is_user());
        assert_eq!(app.comparison.user_code, "{\n  a;\n\n}");
        assert!(app.composer.is_empty());
        assert!(app.composer.is_submitting);
        assert_eq!(app.ui.phase, ConversationPhase::Submitting);
        assert!(app.ui.is_typing_indicator_visible());
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let mut app = create_test_app();
        submit(&mut app, "first").expect("stream");
        assert!(submit(&mut app, "second").is_none());
        let users = app.ui.messages.iter().filter(|m| m.is_user()).count();
        assert_eq!(users, 1);
        // The rejected draft stays in the composer.
        assert_eq!(app.composer.draft(), "second");
    }

    #[test]
    fn chunks_move_to_streaming_and_completion_returns_to_idle() {
        let mut app = create_test_app();
        let id = submit(&mut app, "hi").expect("stream");
        chunk(&mut app, "Hello", id);
        assert_eq!(app.ui.phase, ConversationPhase::Streaming);
        apply_action(&mut app, AppAction::StreamCompleted { stream_id: id }, default_ctx());
        assert_eq!(app.ui.phase, ConversationPhase::Idle);
        assert_eq!(app.ui.last_outcome, Some(StreamOutcome::Completed));
        assert!(!app.composer.is_submitting);
        assert_eq!(app.comparison.ai_code, "Hello");
        assert!(app.session.stream_cancel_token.is_none());
    }

    #[test]
    fn stop_during_streaming_keeps_partial_content() {
        let mut app = create_test_app();
        let id = submit(&mut app, "hi").expect("stream");
        chunk(&mut app, "Partial", id);
        let token = app.session.stream_cancel_token.clone().expect("token");

        apply_action(&mut app, AppAction::CancelStreaming, default_ctx());

        assert!(token.is_cancelled());
        assert_eq!(app.ui.phase, ConversationPhase::Idle);
        assert!(!app.ui.is_typing_indicator_visible());
        assert_eq!(app.ui.last_outcome, Some(StreamOutcome::Cancelled));
        assert!(app.composer.is_cancelled);
        assert!(!app.composer.is_submitting);
        assert_eq!(
            app.ui.messages.back().map(|m| m.content.as_str()),
            Some("Partial")
        );

        // Late chunks from the stopped stream are dropped.
        chunk(&mut app, " more", id);
        assert_eq!(
            app.ui.messages.back().map(|m| m.content.as_str()),
            Some("Partial")
        );
    }

    #[test]
    fn stop_before_first_chunk_drops_placeholder() {
        let mut app = create_test_app();
        submit(&mut app, "hi").expect("stream");
        apply_action(&mut app, AppAction::CancelStreaming, default_ctx());
        assert_eq!(app.ui.messages.len(), 1);
        assert!(submit(&mut app, "retry").is_some());
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let mut app = create_test_app();
        apply_action(&mut app, AppAction::CancelStreaming, default_ctx());
        assert!(app.ui.last_outcome.is_none());
        assert!(!app.composer.is_cancelled);
    }

    #[test]
    fn stream_error_drops_empty_placeholder_and_sets_error_status() {
        let mut app = create_test_app();
        let id = submit(&mut app, "hi").expect("stream");
        apply_action(
            &mut app,
            AppAction::StreamErrored {
                message: "  API error: boom  ".into(),
                stream_id: id,
            },
            default_ctx(),
        );
        assert_eq!(app.ui.messages.len(), 1);
        assert_eq!(app.ui.phase, ConversationPhase::Idle);
        assert_eq!(app.ui.last_outcome, Some(StreamOutcome::Failed));
        let status = app.ui.status.as_ref().expect("status");
        assert_eq!(status.text, "API error: boom");
        assert_eq!(status.kind, StatusKind::Error);

        // The trailing End for the failed stream changes nothing.
        apply_action(&mut app, AppAction::StreamCompleted { stream_id: id }, default_ctx());
        assert_eq!(app.ui.last_outcome, Some(StreamOutcome::Failed));
    }

    #[test]
    fn events_from_stale_streams_are_ignored() {
        let mut app = create_test_app();
        let first = submit(&mut app, "one").expect("stream");
        apply_action(&mut app, AppAction::CancelStreaming, default_ctx());
        let second = submit(&mut app, "two").expect("stream");
        assert_ne!(first, second);
        chunk(&mut app, "stale", first);
        chunk(&mut app, "fresh", second);
        assert_eq!(
            app.ui.messages.back().map(|m| m.content.as_str()),
            Some("fresh")
        );
    }
}
