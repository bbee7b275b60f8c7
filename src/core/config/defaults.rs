use crate::core::config::data::Config;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_THEME: &str = "dark";
pub const DEFAULT_USER_NAME: &str = "You";
pub const DEFAULT_ASSISTANT_NAME: &str = "Linga";

impl Config {
    pub fn base_url_or_default(&self) -> &str {
        non_empty(self.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn model_or_default(&self) -> &str {
        non_empty(self.model.as_deref()).unwrap_or(DEFAULT_MODEL)
    }

    pub fn theme_or_default(&self) -> &str {
        non_empty(self.theme.as_deref()).unwrap_or(DEFAULT_THEME)
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn comparison_overlay_enabled(&self) -> bool {
        self.comparison_overlay.unwrap_or(true)
    }

    pub fn user_name_or_default(&self) -> &str {
        non_empty(self.user_name.as_deref()).unwrap_or(DEFAULT_USER_NAME)
    }

    pub fn assistant_name_or_default(&self) -> &str {
        non_empty(self.assistant_name.as_deref()).unwrap_or(DEFAULT_ASSISTANT_NAME)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
