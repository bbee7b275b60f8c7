use tokio_util::sync::CancellationToken;

use crate::api::ChatMessage;
use crate::core::chat_stream::StreamParams;
use crate::core::config::Config;
use crate::ui::theme::Theme;

pub mod actions;
pub mod comparison;
pub mod composer;
pub mod conversation;
pub mod session;
pub mod ui_state;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand,
};
pub use comparison::ComparisonState;
pub use composer::{ComposerKey, ComposerState, SubmitRejection};
pub use conversation::ConversationController;
pub use session::{SessionContext, SessionEnv, SessionOverrides};
pub use ui_state::{ConversationPhase, StreamOutcome, UiState};

/// Display parameters for the chat screen.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub show_comparison_overlay: bool,
    pub theme: Theme,
    pub markdown: bool,
    pub syntax: bool,
    pub user_name: String,
    pub assistant_name: String,
}

impl ViewConfig {
    pub fn from_config(config: &Config, theme: Theme) -> Self {
        Self {
            show_comparison_overlay: config.comparison_overlay_enabled(),
            theme,
            markdown: config.markdown_enabled(),
            syntax: config.syntax_enabled(),
            user_name: config.user_name_or_default().to_string(),
            assistant_name: config.assistant_name_or_default().to_string(),
        }
    }
}

/// Startup options gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppInitConfig {
    pub session: SessionOverrides,
    pub disable_markdown: bool,
    pub disable_syntax: bool,
    pub disable_comparison: bool,
}

pub struct App {
    pub session: SessionContext,
    pub ui: UiState,
    pub composer: ComposerState,
    pub comparison: ComparisonState,
    pub comparison_enabled: bool,
}

impl App {
    pub fn new(session: SessionContext, view: ViewConfig) -> Self {
        let mut composer = ComposerState::new();
        composer.configure(&view.theme);
        let ui = UiState::new(
            view.theme,
            view.markdown,
            view.syntax,
            view.user_name,
            view.assistant_name,
        );
        Self {
            session,
            ui,
            composer,
            comparison: ComparisonState::default(),
            comparison_enabled: view.show_comparison_overlay,
        }
    }

    pub fn from_config(init: AppInitConfig, config: &Config, env: &SessionEnv) -> Self {
        let theme = session::resolve_theme(config, &init.session);
        let mut view = ViewConfig::from_config(config, theme);
        view.markdown &= !init.disable_markdown;
        view.syntax &= !init.disable_syntax;
        view.show_comparison_overlay &= !init.disable_comparison;
        let session = SessionContext::new(config, &init.session, env);
        Self::new(session, view)
    }

    pub fn conversation(&mut self) -> ConversationController<'_> {
        ConversationController::new(&mut self.session, &mut self.ui, &mut self.comparison)
    }

    /// Events are applied only for the newest stream, and only while a
    /// response is still in flight.
    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.session.is_current_stream(stream_id) && self.ui.is_busy()
    }

    /// Rows the input box needs inside its border.
    pub fn input_area_height(&self, width: u16) -> u16 {
        self.composer.area_height(width)
    }

    /// Rows available to the transcript for a terminal of the given size.
    pub fn transcript_height(&mut self, term_width: u16, term_height: u16) -> u16 {
        let input_area_height = self.input_area_height(term_width);
        self.conversation()
            .calculate_available_height(term_height, input_area_height)
    }

    pub fn build_stream_params(
        &self,
        api_messages: Vec<ChatMessage>,
        cancel_token: CancellationToken,
        stream_id: u64,
    ) -> StreamParams {
        StreamParams {
            client: self.session.client.clone(),
            base_url: self.session.base_url.clone(),
            api_key: self.session.api_key.clone(),
            model: self.session.model.clone(),
            api_messages,
            cancel_token,
            stream_id,
        }
    }

    pub fn request_exit(&mut self) {
        self.conversation().cancel_current_stream();
        self.ui.exit_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_switches_turn_features_off() {
        let init = AppInitConfig {
            disable_markdown: true,
            disable_comparison: true,
            ..AppInitConfig::default()
        };
        let app = App::from_config(init, &Config::default(), &SessionEnv::default());
        assert!(!app.ui.markdown_enabled);
        assert!(app.ui.syntax_enabled);
        assert!(!app.comparison_enabled);
    }

    #[test]
    fn config_flags_feed_the_view() {
        let config = Config {
            syntax: Some(false),
            user_name: Some("Ada".into()),
            ..Config::default()
        };
        let app = App::from_config(AppInitConfig::default(), &config, &SessionEnv::default());
        assert!(!app.ui.syntax_enabled);
        assert_eq!(app.ui.user_display_name, "Ada");
        assert_eq!(app.ui.assistant_display_name, "Linga");
    }

    #[test]
    fn stream_events_require_in_flight_response() {
        let mut app = crate::utils::test_utils::create_test_app();
        let (_token, id) = app.conversation().start_new_stream();
        assert!(app.is_current_stream(id));
        assert!(!app.is_current_stream(id + 1));
        app.ui.end_streaming(StreamOutcome::Cancelled);
        assert!(!app.is_current_stream(id));
    }

    #[test]
    fn request_exit_cancels_stream() {
        let mut app = crate::utils::test_utils::create_test_app();
        let (token, _) = app.conversation().start_new_stream();
        app.request_exit();
        assert!(token.is_cancelled());
        assert!(app.ui.exit_requested);
    }
}
