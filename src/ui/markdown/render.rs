use super::blocks::{parse_blocks, InlineSpan, RenderNode};
use super::code::present_code_block;
use super::metadata::{CodeBlockRange, RenderedMessage};
use crate::core::message::Message;
use crate::ui::theme::Theme;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

const RULE_WIDTH: usize = 24;

/// Configuration for rendering a single transcript message.
#[derive(Clone, Debug)]
pub struct MessageRenderConfig<'a> {
    pub markdown: bool,
    pub syntax_highlighting: bool,
    pub user_display_name: &'a str,
    pub assistant_display_name: &'a str,
}

impl<'a> MessageRenderConfig<'a> {
    pub fn markdown(markdown_enabled: bool, syntax_highlighting: bool) -> Self {
        Self {
            markdown: markdown_enabled,
            syntax_highlighting: markdown_enabled && syntax_highlighting,
            user_display_name: crate::core::config::defaults::DEFAULT_USER_NAME,
            assistant_display_name: crate::core::config::defaults::DEFAULT_ASSISTANT_NAME,
        }
    }

    pub fn with_display_names(mut self, user: &'a str, assistant: &'a str) -> Self {
        self.user_display_name = user;
        self.assistant_display_name = assistant;
        self
    }
}

fn inline_style(base: Style, span: &InlineSpan, theme: &Theme) -> Style {
    let mut style = base;
    if span.style.code {
        style = style.patch(theme.md_inline_code_style);
    }
    if span.style.link {
        style = style.patch(theme.md_link_style);
    }
    if span.style.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.style.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if span.style.strike {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    style
}

/// Turn inline spans into one or more lines; hard breaks start a new line.
fn inline_lines(
    prefix: Vec<Span<'static>>,
    continuation: &str,
    spans: &[InlineSpan],
    base: Style,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current = prefix;
    for span in spans {
        let style = inline_style(base, span, theme);
        let mut parts = span.text.split('\n');
        if let Some(first) = parts.next() {
            if !first.is_empty() {
                current.push(Span::styled(first.to_string(), style));
            }
        }
        for part in parts {
            lines.push(Line::from(std::mem::take(&mut current)));
            if !continuation.is_empty() {
                current.push(Span::raw(continuation.to_string()));
            }
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn needs_gap(prev: &RenderNode, next: &RenderNode) -> bool {
    !matches!(
        (prev, next),
        (RenderNode::ListItem { .. }, RenderNode::ListItem { .. })
            | (RenderNode::TableRow { .. }, RenderNode::TableRow { .. })
            | (RenderNode::Quote { .. }, RenderNode::Quote { .. })
    )
}

/// Render parsed nodes to lines. Code nodes go through the code block
/// presenter; the rest are rendered generically with `base` as text style.
pub fn render_nodes(
    nodes: &[RenderNode],
    theme: &Theme,
    base: Style,
    syntax_enabled: bool,
) -> RenderedMessage {
    let mut out = RenderedMessage::default();
    let mut prev: Option<&RenderNode> = None;

    for node in nodes {
        if let Some(prev) = prev {
            if needs_gap(prev, node) {
                out.lines.push(Line::from(""));
            }
        }
        prev = Some(node);

        match node {
            RenderNode::Heading { spans, .. } => {
                let style = base.patch(theme.md_heading_style);
                out.lines
                    .extend(inline_lines(Vec::new(), "", spans, style, theme));
            }
            RenderNode::Paragraph { spans } => {
                out.lines
                    .extend(inline_lines(Vec::new(), "", spans, base, theme));
            }
            RenderNode::ListItem {
                depth,
                marker,
                spans,
            } => {
                let indent = "  ".repeat(depth.saturating_sub(1));
                let hang = " ".repeat(marker.chars().count().max(1) + 1);
                let prefix = if marker.is_empty() {
                    vec![Span::raw(format!("{indent}{hang}"))]
                } else {
                    vec![
                        Span::raw(indent.clone()),
                        Span::styled(format!("{marker} "), theme.md_list_marker_style),
                    ]
                };
                out.lines.extend(inline_lines(
                    prefix,
                    &format!("{indent}{hang}"),
                    spans,
                    base,
                    theme,
                ));
            }
            RenderNode::Quote { depth, spans } => {
                let bar = "│ ".repeat(*depth);
                let style = base.patch(theme.md_quote_style);
                out.lines.extend(inline_lines(
                    vec![Span::styled(bar.clone(), theme.md_quote_style)],
                    &bar,
                    spans,
                    style,
                    theme,
                ));
            }
            RenderNode::Rule => {
                out.lines
                    .push(Line::from(Span::styled("─".repeat(RULE_WIDTH), theme.md_rule_style)));
            }
            RenderNode::TableRow { header, cells } => {
                let mut spans = Vec::new();
                for (i, cell) in cells.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::styled(" │ ", theme.md_rule_style));
                    }
                    let mut style = base;
                    if *header {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    for span in cell {
                        spans.push(Span::styled(
                            span.text.replace('\n', " "),
                            inline_style(style, span, theme),
                        ));
                    }
                }
                out.lines.push(Line::from(spans));
                if *header {
                    out.lines.push(Line::from(Span::styled(
                        "─".repeat(RULE_WIDTH),
                        theme.md_rule_style,
                    )));
                }
            }
            RenderNode::Code(code) => {
                let presented = present_code_block(code, theme, syntax_enabled);
                let start = out.lines.len();
                let len = presented.lines.len();
                out.lines.extend(presented.lines);
                if let Some(copy) = presented.copy {
                    out.code_blocks.push(CodeBlockRange { start, len, copy });
                }
            }
        }
    }

    out
}

fn author_header(msg: &Message, theme: &Theme, cfg: &MessageRenderConfig<'_>) -> Line<'static> {
    let (name, style) = if msg.is_user() {
        (cfg.user_display_name, theme.user_prefix_style)
    } else {
        (cfg.assistant_display_name, theme.assistant_prefix_style)
    };
    Line::from(vec![
        Span::styled(name.to_string(), style),
        Span::styled(format!("  {}", msg.time_label()), theme.timestamp_style),
    ])
}

/// Render a message with its author header. Markdown parsing is skipped when
/// disabled, in which case content lines are shown verbatim.
pub fn render_message_with_config(
    msg: &Message,
    theme: &Theme,
    cfg: &MessageRenderConfig<'_>,
) -> RenderedMessage {
    let base = if msg.is_user() {
        theme.user_text_style
    } else {
        theme.assistant_text_style
    };

    let body = if cfg.markdown {
        render_nodes(
            &parse_blocks(&msg.content),
            theme,
            base,
            cfg.syntax_highlighting,
        )
    } else {
        RenderedMessage {
            lines: msg
                .content
                .lines()
                .map(|line| Line::from(Span::styled(line.replace('\t', "    "), base)))
                .collect(),
            code_blocks: Vec::new(),
        }
    };

    let mut out = RenderedMessage {
        lines: Vec::with_capacity(body.lines.len() + 2),
        code_blocks: Vec::with_capacity(body.code_blocks.len()),
    };
    out.lines.push(author_header(msg, theme, cfg));
    let body_start = out.lines.len();
    out.lines.extend(body.lines);
    out.code_blocks
        .extend(body.code_blocks.into_iter().map(|range| CodeBlockRange {
            start: range.start + body_start,
            ..range
        }));
    out.lines.push(Line::from(""));

    if msg.is_user() {
        for line in &mut out.lines {
            line.alignment = Some(Alignment::Right);
        }
    }
    out
}
