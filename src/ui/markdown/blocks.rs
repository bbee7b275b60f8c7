//! Markdown → typed render nodes.
//!
//! One top-to-bottom walk over pulldown-cmark events; sibling order is
//! preserved and nothing is revisited. Fenced code becomes a [`CodeNode`]
//! for the code block presenter, everything else is a generic node.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
    pub link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    pub text: String,
    pub style: InlineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeNode {
    /// Language extracted from the fence's `language-*` class name.
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    Heading {
        level: u8,
        spans: Vec<InlineSpan>,
    },
    Paragraph {
        spans: Vec<InlineSpan>,
    },
    /// One paragraph of a list item. `marker` is empty for continuation
    /// paragraphs of the same item.
    ListItem {
        depth: usize,
        marker: String,
        spans: Vec<InlineSpan>,
    },
    Quote {
        depth: usize,
        spans: Vec<InlineSpan>,
    },
    Rule,
    TableRow {
        header: bool,
        cells: Vec<Vec<InlineSpan>>,
    },
    Code(CodeNode),
}

/// Class name a fenced block gets for its info string, e.g. `language-rust`.
pub fn code_class_name(info: &str) -> Option<String> {
    info.split_ascii_whitespace()
        .next()
        .map(|word| format!("language-{word}"))
}

/// Extract the language from a class name with `language-(\w+)`.
pub fn language_tag_from_class(class_name: &str) -> Option<String> {
    static LANGUAGE_CLASS: OnceLock<Option<Regex>> = OnceLock::new();
    let re = LANGUAGE_CLASS
        .get_or_init(|| Regex::new(r"language-(\w+)").ok())
        .as_ref()?;
    re.captures(class_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

struct ListFrame {
    next_number: Option<u64>,
}

#[derive(Default)]
struct BlockWalker {
    nodes: Vec<RenderNode>,
    inline: Vec<InlineSpan>,
    style_stack: Vec<InlineStyle>,
    lists: Vec<ListFrame>,
    /// Marker waiting for the first paragraph of the current item.
    pending_marker: Option<String>,
    quote_depth: usize,
    heading: Option<u8>,
    code: Option<CodeNode>,
    table_row: Option<Vec<Vec<InlineSpan>>>,
    in_table_head: bool,
}

impl BlockWalker {
    fn current_style(&self) -> InlineStyle {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(&mut InlineStyle)) {
        let mut style = self.current_style();
        f(&mut style);
        self.style_stack.push(style);
    }

    fn push_text(&mut self, text: &str, style: InlineStyle) {
        if text.is_empty() {
            return;
        }
        match self.inline.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.inline.push(InlineSpan {
                text: text.to_string(),
                style,
            }),
        }
    }

    /// Close the current run of inline content into the node its context calls for.
    fn flush_inline(&mut self) {
        if self.inline.is_empty() && self.pending_marker.is_none() {
            return;
        }
        let spans = std::mem::take(&mut self.inline);
        if let Some(level) = self.heading {
            self.nodes.push(RenderNode::Heading { level, spans });
        } else if !self.lists.is_empty() {
            let marker = self.pending_marker.take().unwrap_or_default();
            if spans.is_empty() && marker.is_empty() {
                return;
            }
            self.nodes.push(RenderNode::ListItem {
                depth: self.lists.len(),
                marker,
                spans,
            });
        } else if self.quote_depth > 0 {
            self.nodes.push(RenderNode::Quote {
                depth: self.quote_depth,
                spans,
            });
        } else if !spans.is_empty() {
            self.nodes.push(RenderNode::Paragraph { spans });
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_inline();
                self.heading = Some(heading_number(level));
            }
            Tag::Paragraph => {}
            Tag::BlockQuote(_) => {
                self.flush_inline();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        code_class_name(&info).and_then(|class| language_tag_from_class(&class))
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeNode {
                    language,
                    code: String::new(),
                });
            }
            Tag::List(start) => {
                self.flush_inline();
                self.lists.push(ListFrame { next_number: start });
            }
            Tag::Item => {
                self.flush_inline();
                let marker = match self.lists.last_mut() {
                    Some(ListFrame {
                        next_number: Some(n),
                    }) => {
                        let marker = format!("{n}.");
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.pending_marker = Some(marker);
            }
            Tag::Table(_) => self.flush_inline(),
            Tag::TableHead => {
                self.in_table_head = true;
                self.table_row = Some(Vec::new());
            }
            Tag::TableRow => self.table_row = Some(Vec::new()),
            Tag::TableCell => self.inline.clear(),
            Tag::Emphasis => self.push_style(|s| s.italic = true),
            Tag::Strong => self.push_style(|s| s.bold = true),
            Tag::Strikethrough => self.push_style(|s| s.strike = true),
            Tag::Link { .. } => self.push_style(|s| s.link = true),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush_inline();
                self.heading = None;
            }
            TagEnd::Paragraph => self.flush_inline(),
            TagEnd::BlockQuote(_) => {
                self.flush_inline();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                if let Some(mut node) = self.code.take() {
                    if node.code.ends_with('\n') {
                        node.code.pop();
                    }
                    self.nodes.push(RenderNode::Code(node));
                }
            }
            TagEnd::List(_) => {
                self.flush_inline();
                self.lists.pop();
            }
            TagEnd::Item => self.flush_inline(),
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.inline);
                if let Some(row) = self.table_row.as_mut() {
                    row.push(cell);
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(cells) = self.table_row.take() {
                    self.nodes.push(RenderNode::TableRow {
                        header: self.in_table_head,
                        cells,
                    });
                }
                self.in_table_head = false;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.style_stack.pop();
            }
            _ => {}
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.code.push_str(&text);
                } else {
                    let style = self.current_style();
                    self.push_text(&text, style);
                }
            }
            Event::Code(text) => {
                let mut style = self.current_style();
                style.code = true;
                self.push_text(&text, style);
            }
            Event::SoftBreak => {
                let style = self.current_style();
                self.push_text(" ", style);
            }
            Event::HardBreak => {
                let style = self.current_style();
                self.push_text("\n", style);
            }
            Event::Rule => {
                self.flush_inline();
                self.nodes.push(RenderNode::Rule);
            }
            Event::TaskListMarker(done) => {
                let style = self.current_style();
                self.push_text(if done { "[x] " } else { "[ ] " }, style);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let style = self.current_style();
                self.push_text(html.trim_end_matches('\n'), style);
            }
            _ => {}
        }
    }
}

fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Parse markdown into render nodes in document order.
pub fn parse_blocks(markdown: &str) -> Vec<RenderNode> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let mut walker = BlockWalker::default();
    for event in Parser::new_ext(markdown, options) {
        walker.event(event);
    }
    walker.flush_inline();
    if let Some(node) = walker.code.take() {
        walker.nodes.push(RenderNode::Code(node));
    }
    walker.nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(spans: &[InlineSpan]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn code_nodes(nodes: &[RenderNode]) -> Vec<&CodeNode> {
        nodes
            .iter()
            .filter_map(|n| match n {
                RenderNode::Code(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fenced_python_block_carries_language() {
        let nodes = parse_blocks("```python\nprint('hi')\n```\n");
        let codes = code_nodes(&nodes);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].language.as_deref(), Some("python"));
        assert_eq!(codes[0].code, "print('hi')");
    }

    #[test]
    fn bare_fence_has_no_language() {
        let nodes = parse_blocks("```\nplain\n```\n");
        let codes = code_nodes(&nodes);
        assert_eq!(codes[0].language, None);
    }

    #[test]
    fn language_uses_first_word_and_word_characters_only() {
        let nodes = parse_blocks("```rust,ignore extra\nfn x() {}\n```\n\n```c++\nint x;\n```\n");
        let codes = code_nodes(&nodes);
        assert_eq!(codes[0].language.as_deref(), Some("rust"));
        assert_eq!(codes[1].language.as_deref(), Some("c"));
    }

    #[test]
    fn language_tag_from_class_matches_pattern() {
        assert_eq!(
            language_tag_from_class("language-typescript"),
            Some("typescript".into())
        );
        assert_eq!(
            language_tag_from_class("hljs language-go"),
            Some("go".into())
        );
        assert_eq!(language_tag_from_class("language-"), None);
        assert_eq!(language_tag_from_class("lang-rust"), None);
        assert_eq!(code_class_name("   "), None);
    }

    #[test]
    fn indented_code_has_no_language() {
        let nodes = parse_blocks("para\n\n    indented\n");
        let codes = code_nodes(&nodes);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].language, None);
        assert_eq!(codes[0].code, "indented");
    }

    #[test]
    fn sibling_order_is_preserved() {
        let md = "# Title\n\nIntro *text*.\n\n```js\nx()\n```\n\n---\n\nOutro";
        let nodes = parse_blocks(md);
        assert!(matches!(nodes[0], RenderNode::Heading { level: 1, .. }));
        assert!(matches!(nodes[1], RenderNode::Paragraph { .. }));
        assert!(matches!(nodes[2], RenderNode::Code(_)));
        assert!(matches!(nodes[3], RenderNode::Rule));
        match &nodes[4] {
            RenderNode::Paragraph { spans } => assert_eq!(plain(spans), "Outro"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inline_styles_are_tracked() {
        let nodes = parse_blocks("a **b** `c` [d](http://x)");
        let RenderNode::Paragraph { spans } = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(plain(spans), "a b c d");
        assert!(spans.iter().any(|s| s.text == "b" && s.style.bold));
        assert!(spans.iter().any(|s| s.text == "c" && s.style.code));
        assert!(spans.iter().any(|s| s.text == "d" && s.style.link));
    }

    #[test]
    fn lists_number_and_nest() {
        let nodes = parse_blocks("3. three\n4. four\n   - inner\n");
        let items: Vec<(usize, String, String)> = nodes
            .iter()
            .filter_map(|n| match n {
                RenderNode::ListItem {
                    depth,
                    marker,
                    spans,
                } => Some((*depth, marker.clone(), plain(spans))),
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                (1, "3.".to_string(), "three".to_string()),
                (1, "4.".to_string(), "four".to_string()),
                (2, "•".to_string(), "inner".to_string()),
            ]
        );
    }

    #[test]
    fn quotes_and_tables_become_nodes() {
        let nodes = parse_blocks("> quoted\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(matches!(&nodes[0], RenderNode::Quote { depth: 1, .. }));
        let rows: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                RenderNode::TableRow { header, cells } => Some((*header, cells.len())),
                _ => None,
            })
            .collect();
        assert_eq!(rows, vec![(true, 2), (false, 2)]);
    }

    #[test]
    fn unterminated_fence_still_yields_code() {
        let nodes = parse_blocks("```rust\nfn partial(");
        let codes = code_nodes(&nodes);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].code, "fn partial(");
    }
}
