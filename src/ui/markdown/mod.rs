//! Markdown rendering for transcript messages.
//!
//! [`blocks`] turns markdown into typed render nodes, [`code`] presents
//! code nodes (highlighting plus the copy affordance) and [`render`] turns
//! nodes into styled terminal lines.

pub mod blocks;
pub mod code;
mod metadata;
pub mod render;

pub use blocks::{parse_blocks, CodeNode, InlineSpan, InlineStyle, RenderNode};
pub use code::{present_code_block, CopyTarget, PresentedCodeBlock};
pub use metadata::{CodeBlockRange, RenderedMessage};
pub use render::{render_message_with_config, render_nodes, MessageRenderConfig};
