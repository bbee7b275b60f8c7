//! Linga is a terminal chat client for asking an assistant about code.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns conversation state, the composer, the comparison overlay,
//!   the naive reindenter, configuration, and streaming orchestration.
//! - [`ui`] renders the terminal interface, including markdown and code block
//!   panels, and runs the interactive event loop.
//! - [`api`] defines the chat completion payloads sent to the backend.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which initializes logging and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
