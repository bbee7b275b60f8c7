use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Copy `text` to the system clipboard through the platform's clipboard command.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let candidates = clipboard_commands();
    let mut last_error = None;
    for &(cmd, args) in candidates {
        match run_with_stdin(cmd, args, text) {
            Ok(()) => {
                debug!(command = cmd, bytes = text.len(), "Copied to clipboard");
                return Ok(());
            }
            Err(err) => last_error = Some(err),
        }
    }
    if candidates.len() > 1 {
        return Err("No clipboard command found (install wl-copy, xclip, or xsel)".to_string());
    }
    Err(last_error.unwrap_or_else(|| "No clipboard command available".to_string()))
}

type ClipboardCommand = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[ClipboardCommand] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_COMMANDS: &[ClipboardCommand] = &[("cmd", &["/C", "clip"])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_COMMANDS: &[ClipboardCommand] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

fn clipboard_commands() -> &'static [ClipboardCommand] {
    CLIPBOARD_COMMANDS
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), String> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| format!("Clipboard command `{cmd}` not available"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| format!("Clipboard command `{cmd}` rejected input: {e}"))?;
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(format!("Clipboard command `{cmd}` failed")),
    }
}
