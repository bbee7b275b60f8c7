//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod settings;
pub mod theme_list;

use std::error::Error;
use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::settings::{apply_setting, unset_setting};
use crate::cli::theme_list::list_themes;
use crate::core::app::{AppInitConfig, SessionOverrides};
use crate::core::config::Config;
use crate::core::reindent::reindent_report;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "linga")]
#[command(version)]
#[command(about = "A terminal chat client for coding questions")]
#[command(
    long_about = "Linga is a full-screen terminal chat interface for OpenAI-compatible APIs. \
Assistant replies are rendered as markdown with highlighted, copyable code blocks, and a \
side-by-side overlay compares your last code snippet with the assistant's.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    API key sent as a bearer token\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  LINGA_LOG         Tracing filter directive; enables the log file\n\n\
Controls:\n\
  Enter             Send the message\n\
  Shift/Alt+Enter   Insert a new line\n\
  Esc               Stop the response in flight (also closes the overlay)\n\
  Ctrl+D            Toggle the comparison overlay\n\
  Left/Right        Resize the overlay panes while it is open\n\
  Ctrl+B            Select a code block to copy\n\
  PgUp/PgDn/Mouse   Scroll through chat history\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this session
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL for this session
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Theme to use for this session
    #[arg(long, global = true, value_name = "THEME")]
    pub theme: Option<String>,

    /// Show message text without markdown rendering
    #[arg(long, global = true)]
    pub no_markdown: bool,

    /// Disable syntax highlighting in code blocks
    #[arg(long, global = true)]
    pub no_syntax: bool,

    /// Disable the comparison overlay
    #[arg(long, global = true)]
    pub no_compare: bool,

    /// Write diagnostic logs to the given file
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// List available themes
    Themes,
    /// Reindent code from a file (or stdin) and print the result
    Reindent {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
}

impl Args {
    fn init_config(&self) -> AppInitConfig {
        AppInitConfig {
            session: SessionOverrides {
                model: self.model.clone(),
                base_url: self.base_url.clone(),
                theme: self.theme.clone(),
            },
            disable_markdown: self.no_markdown,
            disable_syntax: self.no_syntax,
            disable_comparison: self.no_compare,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = init_tracing(args.debug_log.as_deref())? {
        debug!(path = %path.display(), "Logging initialized");
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let init = args.init_config();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(init).await,
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            match apply_setting(&mut config, &key, &value.join(" ")) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match unset_setting(&mut config, &key) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
        }
        Commands::Themes => list_themes(),
        Commands::Reindent { file } => {
            let source = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let report = reindent_report(&source);
            print!("{}", report.output);
            if !report.is_balanced() {
                eprintln!(
                    "⚠️  Unbalanced braces: {} unclosed, {} unmatched closing",
                    report.final_level, report.clamped_closers
                );
            }
            Ok(())
        }
    }
}
