mod input;
mod streaming;
mod view;

use tokio::sync::mpsc;

use super::App;
use crate::core::chat_stream::StreamParams;

pub enum AppAction {
    AppendResponseChunk {
        content: String,
        stream_id: u64,
    },
    StreamErrored {
        message: String,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    /// Submit whatever the composer currently holds.
    SubmitDraft,
    CancelStreaming,
    InsertIntoInput {
        text: String,
    },
    ClearInput,
    SetStatus {
        message: String,
    },
    ClearStatus,
    ToggleComparison,
    CloseComparison,
    SetSplit {
        percent: i64,
    },
    NudgeSplit {
        delta: i64,
    },
    SetSplitFromColumn {
        column: u16,
        total: u16,
    },
    ScrollUp {
        lines: u16,
    },
    ScrollDown {
        lines: u16,
    },
    PageUp,
    PageDown,
    ScrollToEnd,
    EnterBlockSelect,
    MoveBlockSelect {
        delta: i32,
    },
    CopySelectedBlock,
    ExitBlockSelect,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) {
        self.dispatch_many([action], ctx);
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

/// Side effects the event loop performs on the app's behalf.
pub enum AppCommand {
    SpawnStream(StreamParams),
    CopyToClipboard(String),
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::AppendResponseChunk { .. }
        | AppAction::StreamErrored { .. }
        | AppAction::StreamCompleted { .. }
        | AppAction::SubmitDraft
        | AppAction::CancelStreaming => streaming::handle_streaming_action(app, action, ctx),

        AppAction::InsertIntoInput { .. }
        | AppAction::ClearInput
        | AppAction::SetStatus { .. }
        | AppAction::ClearStatus
        | AppAction::Quit => input::handle_input_action(app, action),

        AppAction::ToggleComparison
        | AppAction::CloseComparison
        | AppAction::SetSplit { .. }
        | AppAction::NudgeSplit { .. }
        | AppAction::SetSplitFromColumn { .. }
        | AppAction::ScrollUp { .. }
        | AppAction::ScrollDown { .. }
        | AppAction::PageUp
        | AppAction::PageDown
        | AppAction::ScrollToEnd
        | AppAction::EnterBlockSelect
        | AppAction::MoveBlockSelect { .. }
        | AppAction::CopySelectedBlock
        | AppAction::ExitBlockSelect => view::handle_view_action(app, action, ctx),
    }
}
