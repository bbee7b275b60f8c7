use super::code::CopyTarget;
use ratatui::text::Line;

/// Lines `start..start + len` of a rendered message hold a copyable code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockRange {
    pub start: usize,
    pub len: usize,
    pub copy: CopyTarget,
}

/// Description of a rendered message (line-based), used by the layout engine.
#[derive(Debug, Clone, Default)]
pub struct RenderedMessage {
    pub lines: Vec<Line<'static>>,
    pub code_blocks: Vec<CodeBlockRange>,
}
