//! Key and mouse routing for the chat screen.
//!
//! Resolution is pure: given the active [`KeyContext`] and an event, produce
//! the actions to dispatch. Keys no binding claims fall through to the
//! composer.

use crate::core::app::comparison::SPLIT_STEP;
use crate::core::app::{App, AppAction};
use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

/// Lines moved per mouse wheel notch.
pub const WHEEL_LINES: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Typing,
    BlockSelect,
    Comparison,
}

impl KeyContext {
    pub fn for_app(app: &App) -> Self {
        if app.ui.in_block_select_mode() {
            KeyContext::BlockSelect
        } else if app.comparison.visible {
            KeyContext::Comparison
        } else {
            KeyContext::Typing
        }
    }
}

pub enum KeyResult {
    Actions(Vec<AppAction>),
    /// Hand the key to the composer.
    Composer,
    Ignored,
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

pub fn resolve_key(context: KeyContext, key: &KeyEvent) -> KeyResult {
    if is_ctrl(key, 'c') {
        return KeyResult::Actions(vec![AppAction::Quit]);
    }

    match context {
        KeyContext::BlockSelect => resolve_block_select_key(key),
        KeyContext::Comparison => match key.code {
            KeyCode::Esc => {
                KeyResult::Actions(vec![AppAction::CloseComparison, AppAction::CancelStreaming])
            }
            KeyCode::Left => KeyResult::Actions(vec![AppAction::NudgeSplit {
                delta: -SPLIT_STEP,
            }]),
            KeyCode::Right => KeyResult::Actions(vec![AppAction::NudgeSplit {
                delta: SPLIT_STEP,
            }]),
            _ => resolve_typing_key(key),
        },
        KeyContext::Typing => resolve_typing_key(key),
    }
}

fn resolve_typing_key(key: &KeyEvent) -> KeyResult {
    if is_ctrl(key, 'd') {
        return KeyResult::Actions(vec![AppAction::ToggleComparison]);
    }
    if is_ctrl(key, 'b') {
        return KeyResult::Actions(vec![AppAction::EnterBlockSelect]);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyResult::Actions(vec![AppAction::CancelStreaming]),
        KeyCode::PageUp => KeyResult::Actions(vec![AppAction::PageUp]),
        KeyCode::PageDown => KeyResult::Actions(vec![AppAction::PageDown]),
        KeyCode::Up if ctrl => KeyResult::Actions(vec![AppAction::ScrollUp { lines: 1 }]),
        KeyCode::Down if ctrl => KeyResult::Actions(vec![AppAction::ScrollDown { lines: 1 }]),
        KeyCode::End if ctrl => KeyResult::Actions(vec![AppAction::ScrollToEnd]),
        _ => KeyResult::Composer,
    }
}

fn resolve_block_select_key(key: &KeyEvent) -> KeyResult {
    match key.code {
        KeyCode::Esc => {
            KeyResult::Actions(vec![AppAction::ExitBlockSelect, AppAction::CancelStreaming])
        }
        KeyCode::Up | KeyCode::Char('k') => {
            KeyResult::Actions(vec![AppAction::MoveBlockSelect { delta: -1 }])
        }
        KeyCode::Down | KeyCode::Char('j') => {
            KeyResult::Actions(vec![AppAction::MoveBlockSelect { delta: 1 }])
        }
        KeyCode::Enter | KeyCode::Char('c') => {
            KeyResult::Actions(vec![AppAction::CopySelectedBlock])
        }
        KeyCode::PageUp => KeyResult::Actions(vec![AppAction::PageUp]),
        KeyCode::PageDown => KeyResult::Actions(vec![AppAction::PageDown]),
        _ => KeyResult::Ignored,
    }
}

/// Map a mouse event. `overlay` is the overlay interior when it is shown.
pub fn resolve_mouse(mouse: &MouseEvent, overlay: Option<Rect>) -> Option<AppAction> {
    match mouse.kind {
        MouseEventKind::ScrollUp => Some(AppAction::ScrollUp { lines: WHEEL_LINES }),
        MouseEventKind::ScrollDown => Some(AppAction::ScrollDown { lines: WHEEL_LINES }),
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            let inner = overlay?;
            let inside = mouse.column >= inner.x
                && mouse.column < inner.right()
                && mouse.row >= inner.y
                && mouse.row < inner.bottom();
            inside.then(|| AppAction::SetSplitFromColumn {
                column: mouse.column - inner.x,
                total: inner.width,
            })
        }
        _ => None,
    }
}
