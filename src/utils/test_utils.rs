use crate::core::app::{App, SessionContext, ViewConfig};
use crate::core::message::Message;
use crate::ui::theme::Theme;
use std::collections::VecDeque;

pub fn create_test_app() -> App {
    let session = SessionContext {
        client: reqwest::Client::new(),
        base_url: "https://api.test.com/v1".to_string(),
        api_key: Some("test-key".to_string()),
        model: "test-model".to_string(),
        stream_cancel_token: None,
        current_stream_id: 0,
    };

    let view = ViewConfig {
        show_comparison_overlay: true,
        theme: Theme::dark_default(),
        markdown: true,
        syntax: false,
        user_name: "You".to_string(),
        assistant_name: "Linga".to_string(),
    };

    App::new(session, view)
}

pub fn create_test_messages() -> VecDeque<Message> {
    let mut messages = VecDeque::new();
    messages.push_back(Message::user("Why does this not compile?\n\nfn main() { let x = 1 }"));
    messages.push_back(Message::assistant(
        "You are missing a semicolon:\n\n```rust\nfn main() {\n    let x = 1;\n}\n```",
    ));
    messages.push_back(Message::user("Thanks!"));
    messages.push_back(Message::assistant("Glad to help."));
    messages
}
