use crate::core::config::data::Config;

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.summary_lines() {
            println!("  {line}");
        }
    }

    pub(crate) fn summary_lines(&self) -> Vec<String> {
        fn or_unset(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("(unset)")
        }

        vec![
            format!("base-url: {}", or_unset(&self.base_url)),
            format!("model: {}", or_unset(&self.model)),
            format!("theme: {}", or_unset(&self.theme)),
            format!("markdown: {}", on_off(self.markdown_enabled())),
            format!("syntax: {}", on_off(self.syntax_enabled())),
            format!(
                "comparison-overlay: {}",
                on_off(self.comparison_overlay_enabled())
            ),
            format!("user-name: {}", or_unset(&self.user_name)),
            format!("assistant-name: {}", or_unset(&self.assistant_name)),
        ]
    }
}
