use super::{App, AppAction, AppActionContext, AppCommand};
use crate::utils::scroll::ScrollState;

pub(super) fn handle_view_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::ToggleComparison => {
            if app.comparison_enabled {
                app.comparison.toggle_visible();
            } else {
                app.ui.set_status("Comparison overlay is disabled");
            }
            None
        }
        AppAction::CloseComparison => {
            app.comparison.close();
            None
        }
        AppAction::SetSplit { percent } => {
            app.comparison.set_split(percent);
            None
        }
        AppAction::NudgeSplit { delta } => {
            app.comparison.nudge_split(delta);
            None
        }
        AppAction::SetSplitFromColumn { column, total } => {
            app.comparison.set_split_from_column(column, total);
            None
        }
        AppAction::ScrollUp { lines } => {
            app.ui.scroll.scroll_up(lines);
            None
        }
        AppAction::ScrollDown { lines } => {
            let (total, viewport) = transcript_metrics(app, ctx);
            app.ui.scroll.scroll_down(lines, total, viewport);
            None
        }
        AppAction::PageUp => {
            let (_, viewport) = transcript_metrics(app, ctx);
            app.ui.scroll.page_up(viewport);
            None
        }
        AppAction::PageDown => {
            let (total, viewport) = transcript_metrics(app, ctx);
            app.ui.scroll.page_down(total, viewport);
            None
        }
        AppAction::ScrollToEnd => {
            let (total, viewport) = transcript_metrics(app, ctx);
            app.ui.scroll.jump_to_end(total, viewport);
            None
        }
        AppAction::EnterBlockSelect => {
            enter_block_select(app, ctx);
            None
        }
        AppAction::MoveBlockSelect { delta } => {
            move_block_select(app, delta, ctx);
            None
        }
        AppAction::CopySelectedBlock => copy_selected_block(app, ctx),
        AppAction::ExitBlockSelect => {
            app.ui.exit_block_select_mode();
            None
        }
        _ => unreachable!("non-view action routed to view handler"),
    }
}

fn transcript_metrics(app: &mut App, ctx: AppActionContext) -> (u16, u16) {
    let viewport = app.transcript_height(ctx.term_width, ctx.term_height);
    let total = app.ui.line_count(ctx.term_width);
    (total, viewport)
}

fn enter_block_select(app: &mut App, ctx: AppActionContext) {
    let count = app.ui.code_block_count(ctx.term_width);
    if count == 0 {
        app.ui.set_status("No copyable code blocks");
        return;
    }
    app.ui.selected_block = Some(count - 1);
    scroll_selected_block_into_view(app, ctx);
}

fn move_block_select(app: &mut App, delta: i32, ctx: AppActionContext) {
    let Some(current) = app.ui.selected_block else {
        return;
    };
    let count = app.ui.code_block_count(ctx.term_width);
    if count == 0 {
        app.ui.exit_block_select_mode();
        return;
    }
    let next = (current as i64 + i64::from(delta)).rem_euclid(count as i64) as usize;
    app.ui.selected_block = Some(next);
    scroll_selected_block_into_view(app, ctx);
}

fn scroll_selected_block_into_view(app: &mut App, ctx: AppActionContext) {
    let Some(index) = app.ui.selected_block else {
        return;
    };
    let viewport = app.transcript_height(ctx.term_width, ctx.term_height);
    let layout = app.ui.layout(ctx.term_width);
    let total = layout.line_count();
    let Some(block) = layout.code_blocks.get(index) else {
        return;
    };
    let start = block.start.min(u16::MAX as usize) as u16;
    let end = (block.start + block.len).min(u16::MAX as usize) as u16;

    let scroll = &mut app.ui.scroll;
    if start < scroll.offset {
        scroll.offset = start;
    } else if end > scroll.offset.saturating_add(viewport) {
        scroll.offset = end.saturating_sub(viewport).min(start);
    }
    scroll.offset = scroll.offset.min(ScrollState::max_offset(total, viewport));
    scroll.auto_scroll = scroll.offset >= ScrollState::max_offset(total, viewport);
}

fn copy_selected_block(app: &mut App, ctx: AppActionContext) -> Option<AppCommand> {
    let index = app.ui.selected_block?;
    let text = app
        .ui
        .layout(ctx.term_width)
        .code_blocks
        .get(index)
        .map(|block| block.copy.text.clone());
    app.ui.exit_block_select_mode();
    text.map(AppCommand::CopyToClipboard)
}
