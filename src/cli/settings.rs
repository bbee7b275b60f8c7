//! `linga set` / `linga unset` handlers.

use std::fmt;

use crate::core::config::Config;
use crate::ui::builtin_themes::find_builtin_theme;

pub const SETTING_KEYS: &[&str] = &[
    "base-url",
    "model",
    "theme",
    "markdown",
    "syntax",
    "comparison-overlay",
    "user-name",
    "assistant-name",
];

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    UnknownTheme { input: String },
    InvalidBoolean(String),
    MissingValue { key: String },
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        eprintln!("❌ {self}");
        match self {
            SettingError::UnknownKey(_) => {
                eprintln!("   Known keys: {}", SETTING_KEYS.join(", "));
            }
            SettingError::UnknownTheme { .. } => {
                eprintln!("   Run 'linga themes' to list available themes.");
            }
            SettingError::InvalidBoolean(_) => {
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::MissingValue { key } => {
                eprintln!("Example: linga set {key} <value>");
            }
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::UnknownTheme { input } => write!(f, "Unknown theme: {input}"),
            SettingError::InvalidBoolean(input) => write!(f, "Invalid boolean value: {input}"),
            SettingError::MissingValue { key } => write!(f, "Missing value for {key}"),
        }
    }
}

impl std::error::Error for SettingError {}

fn parse_bool(value: &str) -> Result<bool, SettingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(SettingError::InvalidBoolean(value.to_string())),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('_', "-")
}

/// Apply `key = value` to `config`. Returns the confirmation line to print.
pub fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<String, SettingError> {
    let key = normalize_key(key);
    let value = value.trim();
    if value.is_empty() {
        return Err(SettingError::MissingValue { key });
    }

    match key.as_str() {
        "base-url" => config.base_url = Some(value.trim_end_matches('/').to_string()),
        "model" => config.model = Some(value.to_string()),
        "theme" => {
            let spec = find_builtin_theme(value).ok_or_else(|| SettingError::UnknownTheme {
                input: value.to_string(),
            })?;
            config.theme = Some(spec.id);
        }
        "markdown" => config.markdown = Some(parse_bool(value)?),
        "syntax" => config.syntax = Some(parse_bool(value)?),
        "comparison-overlay" => config.comparison_overlay = Some(parse_bool(value)?),
        "user-name" => config.user_name = Some(value.to_string()),
        "assistant-name" => config.assistant_name = Some(value.to_string()),
        _ => return Err(SettingError::UnknownKey(key)),
    }

    Ok(format!("✅ Set {key}"))
}

/// Reset `key` to its default.
pub fn unset_setting(config: &mut Config, key: &str) -> Result<String, SettingError> {
    let key = normalize_key(key);
    match key.as_str() {
        "base-url" => config.base_url = None,
        "model" => config.model = None,
        "theme" => config.theme = None,
        "markdown" => config.markdown = None,
        "syntax" => config.syntax = None,
        "comparison-overlay" => config.comparison_overlay = None,
        "user-name" => config.user_name = None,
        "assistant-name" => config.assistant_name = None,
        _ => return Err(SettingError::UnknownKey(key)),
    }
    Ok(format!("✅ Unset {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_string_values() {
        let mut config = Config::default();
        apply_setting(&mut config, "model", "gpt-4o").unwrap();
        apply_setting(&mut config, "base_url", "http://localhost:8080/v1/").unwrap();
        apply_setting(&mut config, "assistant-name", "Helper").unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.assistant_name.as_deref(), Some("Helper"));
    }

    #[test]
    fn set_boolean_values() {
        let mut config = Config::default();
        apply_setting(&mut config, "markdown", "off").unwrap();
        apply_setting(&mut config, "comparison-overlay", "Yes").unwrap();
        assert_eq!(config.markdown, Some(false));
        assert_eq!(config.comparison_overlay, Some(true));
        assert_eq!(
            apply_setting(&mut config, "syntax", "maybe"),
            Err(SettingError::InvalidBoolean("maybe".into()))
        );
    }

    #[test]
    fn theme_must_exist() {
        let mut config = Config::default();
        apply_setting(&mut config, "theme", "DRACULA").unwrap();
        assert_eq!(config.theme.as_deref(), Some("dracula"));
        assert!(matches!(
            apply_setting(&mut config, "theme", "neon"),
            Err(SettingError::UnknownTheme { .. })
        ));
        assert_eq!(config.theme.as_deref(), Some("dracula"));
    }

    #[test]
    fn unknown_and_blank_are_rejected() {
        let mut config = Config::default();
        assert_eq!(
            apply_setting(&mut config, "provider", "x"),
            Err(SettingError::UnknownKey("provider".into()))
        );
        assert!(matches!(
            apply_setting(&mut config, "model", "  "),
            Err(SettingError::MissingValue { .. })
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unset_restores_default() {
        let mut config = Config {
            user_name: Some("Sam".into()),
            syntax: Some(false),
            ..Config::default()
        };
        unset_setting(&mut config, "user-name").unwrap();
        unset_setting(&mut config, "syntax").unwrap();
        assert_eq!(config, Config::default());
        assert!(unset_setting(&mut config, "nope").is_err());
    }
}
