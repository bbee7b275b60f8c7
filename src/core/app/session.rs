use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::config::Config;
use crate::ui::theme::Theme;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Connection details plus the bookkeeping for the in-flight stream.
pub struct SessionContext {
    pub client: Client,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub stream_cancel_token: Option<CancellationToken>,
    pub current_stream_id: u64,
}

/// Values supplied on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub theme: Option<String>,
}

/// Process environment relevant to session setup, captured once so tests can
/// supply their own.
#[derive(Debug, Clone, Default)]
pub struct SessionEnv {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl SessionEnv {
    pub fn from_process() -> Self {
        Self {
            api_key: non_blank(std::env::var(API_KEY_ENV).ok()),
            base_url: non_blank(std::env::var(BASE_URL_ENV).ok()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SessionContext {
    pub fn new(config: &Config, overrides: &SessionOverrides, env: &SessionEnv) -> Self {
        let base_url = non_blank(overrides.base_url.clone())
            .or_else(|| env.base_url.clone())
            .unwrap_or_else(|| config.base_url_or_default().to_string());
        let model = non_blank(overrides.model.clone())
            .unwrap_or_else(|| config.model_or_default().to_string());

        debug!(
            base_url = %base_url,
            model = %model,
            has_api_key = env.api_key.is_some(),
            "Session configured"
        );

        Self {
            client: Client::new(),
            base_url,
            api_key: env.api_key.clone(),
            model,
            stream_cancel_token: None,
            current_stream_id: 0,
        }
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        stream_id == self.current_stream_id
    }
}

/// Theme named on the command line, else in the config, else the default.
pub(crate) fn resolve_theme(config: &Config, overrides: &SessionOverrides) -> Theme {
    match non_blank(overrides.theme.clone()) {
        Some(name) => Theme::from_name(&name),
        None => Theme::from_name(config.theme_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_beats_environment_and_config() {
        let config = Config {
            base_url: Some("https://config.example/v1".into()),
            model: Some("config-model".into()),
            ..Config::default()
        };
        let env = SessionEnv {
            api_key: Some("sk-test".into()),
            base_url: Some("https://env.example/v1".into()),
        };

        let session = SessionContext::new(&config, &SessionOverrides::default(), &env);
        assert_eq!(session.base_url, "https://env.example/v1");
        assert_eq!(session.model, "config-model");
        assert_eq!(session.api_key.as_deref(), Some("sk-test"));

        let overrides = SessionOverrides {
            model: Some("cli-model".into()),
            base_url: Some("http://localhost:8080/v1".into()),
            theme: None,
        };
        let session = SessionContext::new(&config, &overrides, &env);
        assert_eq!(session.base_url, "http://localhost:8080/v1");
        assert_eq!(session.model, "cli-model");
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let session = SessionContext::new(
            &Config::default(),
            &SessionOverrides::default(),
            &SessionEnv::default(),
        );
        assert_eq!(session.base_url, crate::core::config::defaults::DEFAULT_BASE_URL);
        assert_eq!(session.model, crate::core::config::defaults::DEFAULT_MODEL);
        assert!(session.api_key.is_none());
        assert_eq!(session.current_stream_id, 0);
    }

    #[test]
    fn blank_override_is_ignored() {
        let overrides = SessionOverrides {
            model: Some("   ".into()),
            ..SessionOverrides::default()
        };
        let session = SessionContext::new(&Config::default(), &overrides, &SessionEnv::default());
        assert_eq!(session.model, crate::core::config::defaults::DEFAULT_MODEL);
    }

    #[test]
    fn theme_override_wins() {
        let config = Config {
            theme: Some("light".into()),
            ..Config::default()
        };
        let overrides = SessionOverrides {
            theme: Some("dracula".into()),
            ..SessionOverrides::default()
        };
        assert_eq!(resolve_theme(&config, &overrides).id, "dracula");
        assert_eq!(
            resolve_theme(&config, &SessionOverrides::default()).id,
            "light"
        );
    }
}
