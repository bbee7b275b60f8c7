use super::blocks::CodeNode;
use crate::ui::theme::Theme;
use ratatui::text::{Line, Span};

pub const COPY_MARKER: &str = "[copy]";

/// Text the copy affordance writes to the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub language: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PresentedCodeBlock {
    pub lines: Vec<Line<'static>>,
    /// Present only for blocks with a language tag.
    pub copy: Option<CopyTarget>,
}

fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}

fn plain_code_lines(code: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut style = theme.md_codeblock_text_style;
    if let Some(bg) = theme.md_codeblock_bg_color {
        style = style.bg(bg);
    }
    code.lines()
        .map(|line| Line::from(Span::styled(detab(line), style)))
        .collect()
}

fn header_line(language: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{language} "), theme.code_header_style),
        Span::styled(COPY_MARKER, theme.copy_marker_style),
    ])
}

/// Present a code node: a language header with a copy marker and highlighted
/// body when the block is tagged, plain lines otherwise.
pub fn present_code_block(node: &CodeNode, theme: &Theme, syntax_enabled: bool) -> PresentedCodeBlock {
    let Some(language) = node.language.as_deref() else {
        return PresentedCodeBlock {
            lines: plain_code_lines(&node.code, theme),
            copy: None,
        };
    };

    let body = if syntax_enabled {
        crate::utils::syntax::highlight_code_block(language, &node.code, theme)
            .unwrap_or_else(|| plain_code_lines(&node.code, theme))
    } else {
        plain_code_lines(&node.code, theme)
    };

    let mut lines = Vec::with_capacity(body.len() + 1);
    lines.push(header_line(language, theme));
    lines.extend(body);

    PresentedCodeBlock {
        lines,
        copy: Some(CopyTarget {
            language: language.to_string(),
            text: node.code.trim().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(language: Option<&str>, code: &str) -> CodeNode {
        CodeNode {
            language: language.map(str::to_string),
            code: code.to_string(),
        }
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn untagged_block_has_no_copy_affordance() {
        let theme = Theme::dark_default();
        let presented = present_code_block(&node(None, "a\nb"), &theme, true);
        assert!(presented.copy.is_none());
        let texts: Vec<String> = presented.lines.iter().map(text).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn tagged_block_gets_header_and_trimmed_copy_target() {
        let theme = Theme::dark_default();
        let presented =
            present_code_block(&node(Some("python"), "\n  print(1)\n\n"), &theme, false);
        assert_eq!(text(&presented.lines[0]), format!("python {COPY_MARKER}"));
        let copy = presented.copy.expect("copy target");
        assert_eq!(copy.text, "print(1)");
        assert_eq!(copy.language, "python");
        // Displayed text is not trimmed.
        assert_eq!(text(&presented.lines[2]), "  print(1)");
    }

    #[test]
    fn highlighted_body_matches_plain_text() {
        let theme = Theme::dark_default();
        let code = "let x = 1;\nlet y = 2;";
        let highlighted = present_code_block(&node(Some("rust"), code), &theme, true);
        let plain = present_code_block(&node(Some("rust"), code), &theme, false);
        let a: Vec<String> = highlighted.lines.iter().map(text).collect();
        let b: Vec<String> = plain.lines.iter().map(text).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn tabs_are_expanded_in_plain_lines() {
        let theme = Theme::dark_default();
        let presented = present_code_block(&node(None, "\tx"), &theme, false);
        assert_eq!(text(&presented.lines[0]), "    x");
    }
}
