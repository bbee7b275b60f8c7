use crate::ui::builtin_themes::{find_builtin_theme, ThemeSpec};
use ratatui::style::{Color, Modifier, Style};

pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Immutable palette handed to every rendering function.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub id: String,
    pub background_color: Color,

    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub timestamp_style: Style,

    pub title_style: Style,
    pub status_style: Style,
    pub error_style: Style,
    pub streaming_indicator_style: Style,

    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub placeholder_style: Style,

    pub md_heading_style: Style,
    pub md_inline_code_style: Style,
    pub md_codeblock_text_style: Style,
    pub md_codeblock_bg_color: Option<Color>,
    pub md_quote_style: Style,
    pub md_link_style: Style,
    pub md_list_marker_style: Style,
    pub md_rule_style: Style,

    pub code_header_style: Style,
    pub copy_marker_style: Style,
    pub selection_style: Style,

    pub overlay_border_style: Style,
    pub overlay_title_style: Style,

    /// Name of the syntect theme used for fenced code.
    pub syntax_theme: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}

impl Theme {
    pub fn dark_default() -> Self {
        match find_builtin_theme("dark") {
            Some(spec) => Self::from_spec(&spec),
            None => Self::palette_fallback(),
        }
    }

    /// Named-color theme used when the built-in table is unavailable.
    fn palette_fallback() -> Self {
        let bold = |c: Color| Style::default().fg(c).add_modifier(Modifier::BOLD);
        Theme {
            id: "dark".to_string(),
            background_color: Color::Black,
            user_prefix_style: bold(Color::Cyan),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: bold(Color::Magenta),
            assistant_text_style: Style::default().fg(Color::White),
            timestamp_style: Style::default().fg(Color::DarkGray),
            title_style: Style::default().fg(Color::Gray),
            status_style: Style::default().fg(Color::Yellow),
            error_style: bold(Color::LightRed),
            streaming_indicator_style: Style::default().fg(Color::White),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            placeholder_style: Style::default().fg(Color::DarkGray),
            md_heading_style: bold(Color::LightBlue),
            md_inline_code_style: Style::default().fg(Color::LightYellow),
            md_codeblock_text_style: Style::default().fg(Color::Gray),
            md_codeblock_bg_color: None,
            md_quote_style: Style::default().fg(Color::DarkGray),
            md_link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            md_list_marker_style: Style::default().fg(Color::Yellow),
            md_rule_style: Style::default().fg(Color::DarkGray),
            code_header_style: bold(Color::Cyan),
            copy_marker_style: bold(Color::Green),
            selection_style: Style::default().add_modifier(Modifier::REVERSED),
            overlay_border_style: Style::default().fg(Color::Magenta),
            overlay_title_style: bold(Color::Magenta),
            syntax_theme: DEFAULT_SYNTAX_THEME.to_string(),
        }
    }

    /// Resolve a theme by id, falling back to the default dark theme.
    pub fn from_name(name: &str) -> Self {
        match find_builtin_theme(name) {
            Some(spec) => Self::from_spec(&spec),
            None => Self::dark_default(),
        }
    }

    pub fn from_spec(spec: &ThemeSpec) -> Self {
        let fallback = Self::palette_fallback();
        let style_or = |value: &Option<String>, default: Style| match value {
            Some(text) => parse_style(text),
            None => default,
        };

        let background_color = spec
            .background
            .as_deref()
            .and_then(parse_color)
            .unwrap_or(fallback.background_color);

        Theme {
            id: spec.id.clone(),
            background_color,
            user_prefix_style: style_or(&spec.user_prefix, fallback.user_prefix_style),
            user_text_style: style_or(&spec.user_text, fallback.user_text_style),
            assistant_prefix_style: style_or(
                &spec.assistant_prefix,
                fallback.assistant_prefix_style,
            ),
            assistant_text_style: style_or(&spec.assistant_text, fallback.assistant_text_style),
            timestamp_style: style_or(&spec.timestamp, fallback.timestamp_style),
            title_style: style_or(&spec.title, fallback.title_style),
            status_style: style_or(&spec.status, fallback.status_style),
            error_style: style_or(&spec.error, fallback.error_style),
            streaming_indicator_style: style_or(
                &spec.streaming_indicator,
                fallback.streaming_indicator_style,
            ),
            input_border_style: style_or(&spec.input_border, fallback.input_border_style),
            input_title_style: style_or(&spec.input_title, fallback.input_title_style),
            input_text_style: style_or(&spec.input_text, fallback.input_text_style),
            input_cursor_style: match &spec.input_cursor_modifiers {
                Some(mods) => parse_style(mods),
                None => fallback.input_cursor_style,
            },
            placeholder_style: style_or(&spec.placeholder, fallback.placeholder_style),
            md_heading_style: style_or(&spec.heading, fallback.md_heading_style),
            md_inline_code_style: style_or(&spec.inline_code, fallback.md_inline_code_style),
            md_codeblock_text_style: style_or(&spec.code_block, fallback.md_codeblock_text_style),
            md_codeblock_bg_color: spec.code_background.as_deref().and_then(parse_color),
            md_quote_style: style_or(&spec.quote, fallback.md_quote_style),
            md_link_style: style_or(&spec.link, fallback.md_link_style),
            md_list_marker_style: style_or(&spec.list_marker, fallback.md_list_marker_style),
            md_rule_style: style_or(&spec.rule, fallback.md_rule_style),
            code_header_style: style_or(&spec.code_header, fallback.code_header_style),
            copy_marker_style: style_or(&spec.copy_marker, fallback.copy_marker_style),
            selection_style: match spec.selection.as_deref().and_then(parse_color) {
                Some(color) => Style::default().bg(color),
                None => fallback.selection_style,
            },
            overlay_border_style: style_or(&spec.overlay_border, fallback.overlay_border_style),
            overlay_title_style: style_or(&spec.overlay_title, fallback.overlay_title_style),
            syntax_theme: spec
                .syntax_theme
                .clone()
                .unwrap_or_else(|| DEFAULT_SYNTAX_THEME.to_string()),
        }
    }
}

fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    if let Some(c) = parse_hex_color(&lower) {
        return Some(c);
    }
    if let Some(c) = parse_rgb_func(&lower) {
        return Some(c);
    }
    match lower.as_str() {
        "black" => Some(Color::Black),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark-grey" | "darkgray" => Some(Color::DarkGray),
        "red" => Some(Color::Red),
        "light_red" | "light-red" => Some(Color::LightRed),
        "green" => Some(Color::Green),
        "light_green" | "light-green" => Some(Color::LightGreen),
        "blue" => Some(Color::Blue),
        "light_blue" | "light-blue" => Some(Color::LightBlue),
        "cyan" => Some(Color::Cyan),
        "light_cyan" | "light-cyan" => Some(Color::LightCyan),
        "magenta" => Some(Color::Magenta),
        "light_magenta" | "light-magenta" => Some(Color::LightMagenta),
        "yellow" => Some(Color::Yellow),
        "light_yellow" | "light-yellow" => Some(Color::LightYellow),
        "reset" => Some(Color::Reset),
        _ => None,
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>, double: bool| -> Option<u8> {
        let digits = hex.get(range)?;
        if double {
            u8::from_str_radix(&digits.repeat(2), 16).ok()
        } else {
            u8::from_str_radix(digits, 16).ok()
        }
    };
    match hex.len() {
        3 => Some(Color::Rgb(
            channel(0..1, true)?,
            channel(1..2, true)?,
            channel(2..3, true)?,
        )),
        6 => Some(Color::Rgb(
            channel(0..2, false)?,
            channel(2..4, false)?,
            channel(4..6, false)?,
        )),
        _ => None,
    }
}

fn parse_rgb_func(s: &str) -> Option<Color> {
    let content = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<_> = content
        .split([',', ' '])
        .filter(|t| !t.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u16>().ok()?;
    let g = parts[1].parse::<u16>().ok()?;
    let b = parts[2].parse::<u16>().ok()?;
    Some(Color::Rgb(
        r.min(255) as u8,
        g.min(255) as u8,
        b.min(255) as u8,
    ))
}

fn parse_style(spec: &str) -> Style {
    let mut style = Style::default();
    for tok in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(color) = parse_color(tok) {
            style = style.fg(color);
            continue;
        }
        match tok.to_ascii_lowercase().as_str() {
            "bold" => style = style.add_modifier(Modifier::BOLD),
            "reversed" => style = style.add_modifier(Modifier::REVERSED),
            "italic" => style = style.add_modifier(Modifier::ITALIC),
            "underlined" => style = style.add_modifier(Modifier::UNDERLINED),
            "dim" => style = style.add_modifier(Modifier::DIM),
            _ => {}
        }
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_rgb_and_named_colors() {
        assert_eq!(parse_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_color("#102030"), Some(Color::Rgb(16, 32, 48)));
        assert_eq!(parse_color("rgb(300, 0, 7)"), Some(Color::Rgb(255, 0, 7)));
        assert_eq!(parse_color("Light-Blue"), Some(Color::LightBlue));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn style_tokens_combine_color_and_modifiers() {
        let style = parse_style("#ff0000, bold, underlined");
        assert_eq!(style.fg, Some(Color::Rgb(255, 0, 0)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn unknown_theme_name_falls_back_to_dark() {
        assert_eq!(Theme::from_name("does-not-exist").id, "dark");
        assert_eq!(Theme::from_name("Dracula").id, "dracula");
    }

    #[test]
    fn sparse_spec_keeps_fallback_styles() {
        let spec = ThemeSpec {
            id: "sparse".into(),
            display_name: "Sparse".into(),
            user_text: Some("red".into()),
            ..Default::default()
        };
        let theme = Theme::from_spec(&spec);
        assert_eq!(theme.user_text_style.fg, Some(Color::Red));
        assert_eq!(theme.background_color, Color::Black);
        assert_eq!(theme.syntax_theme, DEFAULT_SYNTAX_THEME);
    }
}
