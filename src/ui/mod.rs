//! Terminal UI layer for the coding assistant chat.
//!
//! Key submodules include:
//! - [`chat_loop`]: the interaction loop that turns terminal events into
//!   [`crate::core::app::AppAction`]s and drives streaming via
//!   [`crate::core::chat_stream`].
//! - [`renderer`] and [`layout`]: frame composition for the transcript, the
//!   input box and the comparison overlay.
//! - [`markdown`]: message text to styled blocks, including code panels.
//! - [`theme`] and [`builtin_themes`]: color and style policy.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns conversation logic and backend coordination.

pub mod builtin_themes;
pub mod chat_loop;
pub mod layout;
pub mod markdown;
pub mod renderer;
pub mod theme;
