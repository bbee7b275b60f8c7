use super::{App, AppAction, AppCommand};

pub(super) fn handle_input_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::InsertIntoInput { text } => {
            if !text.is_empty() {
                app.composer.insert_str(&text);
            }
            None
        }
        AppAction::ClearInput => {
            app.composer.clear();
            None
        }
        AppAction::SetStatus { message } => {
            app.ui.set_status(message);
            None
        }
        AppAction::ClearStatus => {
            app.ui.clear_status();
            None
        }
        AppAction::Quit => {
            app.request_exit();
            None
        }
        _ => unreachable!("non-input action routed to input handler"),
    }
}
