use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ThemeSpec {
    pub id: String,
    pub display_name: String,
    pub background: Option<String>,
    pub user_prefix: Option<String>,
    pub user_text: Option<String>,
    pub assistant_prefix: Option<String>,
    pub assistant_text: Option<String>,
    pub timestamp: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub streaming_indicator: Option<String>,
    pub input_border: Option<String>,
    pub input_title: Option<String>,
    pub input_text: Option<String>,
    pub input_cursor_modifiers: Option<String>,
    pub placeholder: Option<String>,
    pub heading: Option<String>,
    pub inline_code: Option<String>,
    pub code_block: Option<String>,
    pub code_background: Option<String>,
    pub code_header: Option<String>,
    pub copy_marker: Option<String>,
    pub quote: Option<String>,
    pub link: Option<String>,
    pub list_marker: Option<String>,
    pub rule: Option<String>,
    pub selection: Option<String>,
    pub overlay_border: Option<String>,
    pub overlay_title: Option<String>,
    pub syntax_theme: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuiltinThemesConfig {
    themes: Vec<ThemeSpec>,
}

pub fn load_builtin_themes() -> Vec<ThemeSpec> {
    const CONFIG_CONTENT: &str = include_str!("../builtin_themes.toml");
    match toml::from_str::<BuiltinThemesConfig>(CONFIG_CONTENT) {
        Ok(config) => config.themes,
        Err(err) => {
            warn!(error = %err, "Failed to parse builtin_themes.toml");
            Vec::new()
        }
    }
}

pub fn find_builtin_theme(id: &str) -> Option<ThemeSpec> {
    load_builtin_themes()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_has_expected_builtins() {
        let themes = load_builtin_themes();
        let ids: Vec<&str> = themes.iter().map(|t| t.id.as_str()).collect();
        for expected in ["dark", "light", "dracula", "solarized-dark", "paper"] {
            assert!(ids.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn every_builtin_names_a_syntax_theme() {
        for theme in load_builtin_themes() {
            assert!(theme.syntax_theme.is_some(), "{} has no syntax theme", theme.id);
        }
    }

    #[test]
    fn find_builtin_theme_works_case_insensitive() {
        let t = find_builtin_theme("DaRk").expect("should find 'dark'");
        assert_eq!(t.id, "dark");
        assert!(find_builtin_theme("nope").is_none());
    }
}
