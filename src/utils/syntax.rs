//! syntect-backed highlighting for fenced code, with a small FIFO cache so
//! re-rendering a streaming transcript does not re-highlight settled blocks.

use crate::ui::theme::Theme;
use ratatui::style::{Color as TuiColor, Style};
use ratatui::text::{Line, Span};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, OnceLock};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

const CACHE_CAPACITY: usize = 64;
const FALLBACK_SYNTECT_THEMES: [&str; 3] =
    ["base16-ocean.dark", "InspiredGitHub", "Solarized (dark)"];

type CacheKey = (String, u64);

struct HighlightCache {
    map: HashMap<CacheKey, Vec<Line<'static>>>,
    order: VecDeque<CacheKey>,
    cap: usize,
}

impl HighlightCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<Vec<Line<'static>>> {
        self.map.get(key).cloned()
    }

    fn put(&mut self, key: CacheKey, value: Vec<Line<'static>>) {
        if !self.map.contains_key(&key) {
            self.order.push_back(key.clone());
        }
        self.map.insert(key, value);
        while self.map.len() > self.cap {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map.len()
    }
}

static HIGHLIGHT_CACHE: OnceLock<Mutex<HighlightCache>> = OnceLock::new();

fn cache() -> MutexGuard<'static, HighlightCache> {
    let lock = HIGHLIGHT_CACHE.get_or_init(|| Mutex::new(HighlightCache::new(CACHE_CAPACITY)));
    // A panic while holding the lock only loses cached entries.
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

pub(crate) fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" | "python3" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" | "console" => "bash".into(),
        "js" | "javascript" | "jsx" | "mjs" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "c" | "h" => "c".into(),
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" => "cpp".into(),
        "cs" | "csharp" => "cs".into(),
        "kotlin" | "kt" => "kotlin".into(),
        "md" | "markdown" => "markdown".into(),
        other => other.into(),
    }
}

fn cache_key(lang: &str, code: &str, theme: &Theme) -> CacheKey {
    let mut hasher = DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    theme.syntax_theme.hash(&mut hasher);
    format!("{:?}", theme.md_codeblock_bg_color).hash(&mut hasher);
    (lang.to_string(), hasher.finish())
}

fn to_tui_color(c: syntect::highlighting::Color) -> TuiColor {
    TuiColor::Rgb(c.r, c.g, c.b)
}

/// Highlight `code` for the language hint. Returns `None` when highlighting
/// fails, in which case callers fall back to plain code lines.
pub fn highlight_code_block(
    lang_hint: &str,
    code: &str,
    theme: &Theme,
) -> Option<Vec<Line<'static>>> {
    let lang = normalize_lang_hint(lang_hint);
    let key = cache_key(&lang, code, theme);
    if let Some(lines) = cache().get(&key) {
        return Some(lines);
    }

    let ts = theme_set();
    let syn_theme = ts.themes.get(&theme.syntax_theme).or_else(|| {
        FALLBACK_SYNTECT_THEMES
            .iter()
            .find_map(|name| ts.themes.get(*name))
    })?;

    let ps = syntax_set();
    let syntax = ps
        .find_syntax_by_token(&lang)
        .unwrap_or_else(|| ps.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, syn_theme);
    let bg = theme.md_codeblock_bg_color;

    let mut out: Vec<Line<'static>> = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = match highlighter.highlight_line(line, ps) {
            Ok(ranges) => ranges,
            Err(err) => {
                debug!(language = %lang, error = %err, "Syntax highlighting failed");
                return None;
            }
        };
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .filter_map(|(style, text)| {
                let frag = text.trim_end_matches(['\n', '\r']);
                if frag.is_empty() {
                    return None;
                }
                let mut st = Style::default().fg(to_tui_color(style.foreground));
                if let Some(bg) = bg {
                    st = st.bg(bg);
                }
                Some(Span::styled(frag.replace('\t', "    "), st))
            })
            .collect();
        out.push(Line::from(spans));
    }

    cache().put(key, out.clone());
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn normalize_lang_hint_maps_common_aliases() {
        assert_eq!(normalize_lang_hint("py"), "python");
        assert_eq!(normalize_lang_hint("JS"), "javascript");
        assert_eq!(normalize_lang_hint("TsX"), "typescript");
        assert_eq!(normalize_lang_hint("yml"), "yaml");
        assert_eq!(normalize_lang_hint("hpp"), "cpp");
        assert_eq!(normalize_lang_hint("rs"), "rust");
        assert_eq!(normalize_lang_hint("haskell"), "haskell");
    }

    #[test]
    fn highlighting_preserves_text_per_line() {
        let theme = Theme::dark_default();
        let code = "fn main() {\n\tprintln!(\"hi\");\n}";
        let lines = highlight_code_block("rust", code, &theme).expect("highlight");
        assert_eq!(
            text_of(&lines),
            vec!["fn main() {", "    println!(\"hi\");", "}"]
        );
        assert!(lines[0].spans.iter().all(|s| s.style.fg.is_some()));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text_syntax() {
        let theme = Theme::dark_default();
        let lines = highlight_code_block("no-such-lang", "a b c", &theme).expect("highlight");
        assert_eq!(text_of(&lines), vec!["a b c"]);
    }

    #[test]
    fn fifo_cache_evicts_oldest_entry() {
        let mut cache = HighlightCache::new(2);
        cache.put(("a".into(), 1), Vec::new());
        cache.put(("b".into(), 2), Vec::new());
        cache.put(("a".into(), 1), Vec::new());
        cache.put(("c".into(), 3), Vec::new());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&("a".into(), 1)).is_none());
        assert!(cache.get(&("c".into(), 3)).is_some());
    }

    #[test]
    fn cache_key_tracks_syntax_theme() {
        let dark = Theme::dark_default();
        let mut other = dark.clone();
        other.syntax_theme = "InspiredGitHub".into();
        assert_ne!(
            cache_key("rust", "x", &dark),
            cache_key("rust", "x", &other)
        );
    }
}
