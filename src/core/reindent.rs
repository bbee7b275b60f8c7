//! Naive brace/semicolon reindenter used for the comparison overlay.
//!
//! This is a character-stream heuristic, not a lexer: braces and semicolons
//! inside string literals or comments are treated exactly like code, so the
//! output can rearrange their contents. The comparison overlay only needs a
//! rough, predictable layout of what the user typed, and keeping the
//! heuristic means the output is stable for any given input.
//!
//! Rules, applied in a single left-to-right pass:
//! - `{` raises the indent level, then breaks the line.
//! - `}` lowers the indent level (never below zero), breaks the line, then
//!   emits the brace.
//! - `;` is emitted, then the line is broken.
//! - an existing newline breaks the line at the current level.
//!
//! Indentation after a break is written lazily, right before the next
//! non-newline character, so blank lines never carry trailing spaces.

/// Width of a single indentation step.
pub const INDENT_UNIT: &str = "  ";

/// Outcome of a reindent pass along with bookkeeping about brace balance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReindentReport {
    pub output: String,
    /// Indent level left open at the end of input (unclosed `{`).
    pub final_level: usize,
    /// Number of `}` that arrived while the level was already zero.
    pub clamped_closers: usize,
}

impl ReindentReport {
    pub fn is_balanced(&self) -> bool {
        self.final_level == 0 && self.clamped_closers == 0
    }
}

struct Reindenter {
    out: String,
    level: usize,
    pending_indent: bool,
    clamped_closers: usize,
}

impl Reindenter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            level: 0,
            pending_indent: false,
            clamped_closers: 0,
        }
    }

    fn break_line(&mut self) {
        self.out.push('\n');
        self.pending_indent = true;
    }

    fn emit(&mut self, ch: char) {
        if self.pending_indent {
            for _ in 0..self.level {
                self.out.push_str(INDENT_UNIT);
            }
            self.pending_indent = false;
        }
        self.out.push(ch);
    }

    fn feed(&mut self, ch: char) {
        match ch {
            '{' => {
                self.level += 1;
                self.emit('{');
                self.break_line();
            }
            '}' => {
                if self.level == 0 {
                    self.clamped_closers += 1;
                } else {
                    self.level -= 1;
                }
                self.break_line();
                self.emit('}');
            }
            ';' => {
                self.emit(';');
                self.break_line();
            }
            '\n' => self.break_line(),
            other => self.emit(other),
        }
    }

    fn finish(self) -> ReindentReport {
        ReindentReport {
            output: self.out,
            final_level: self.level,
            clamped_closers: self.clamped_closers,
        }
    }
}

/// Reindent `source` and report how balanced its braces were.
pub fn reindent_report(source: &str) -> ReindentReport {
    let mut state = Reindenter::with_capacity(source.len() + source.len() / 4);
    for ch in source.chars() {
        state.feed(ch);
    }
    state.finish()
}

/// Reindent `source` with the brace/semicolon heuristic.
///
/// ```
/// use linga::core::reindent::reindent;
///
/// assert_eq!(reindent("{a;}"), "{\n  a;\n\n}");
/// assert_eq!(reindent("plain text\nstays put"), "plain text\nstays put");
/// ```
pub fn reindent(source: &str) -> String {
    reindent_report(source).output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_matches_contract() {
        assert_eq!(reindent("{a;}"), "{\n  a;\n\n}");
    }

    #[test]
    fn text_without_structural_characters_is_unchanged() {
        let samples = [
            "",
            "hello world",
            "line one\nline two\n",
            "  leading spaces survive\n\ttabs too",
            "unicode: héllo → wörld",
            "\n\n\n",
        ];
        for sample in samples {
            assert_eq!(reindent(sample), sample, "sample {sample:?}");
        }
    }

    #[test]
    fn nested_blocks_indent_by_level() {
        let out = reindent("fn main(){if x{y();}}");
        assert_eq!(out, "fn main(){\n  if x{\n    y();\n\n  }\n}");
    }

    #[test]
    fn balanced_input_returns_to_level_zero() {
        for src in ["{}", "{{}}", "a{b{c;}d}e", "{\n{\n}\n}", "x;{y;{z;};}"] {
            let report = reindent_report(src);
            assert_eq!(report.final_level, 0, "source {src:?}");
            assert!(report.is_balanced());
        }
    }

    #[test]
    fn unbalanced_closers_clamp_at_zero() {
        let report = reindent_report("}}a{b");
        assert_eq!(report.clamped_closers, 2);
        assert_eq!(report.final_level, 1);
        assert!(!report.is_balanced());
        assert_eq!(report.output, "\n}\n}a{\n  b");
    }

    #[test]
    fn existing_newlines_take_current_level() {
        assert_eq!(reindent("{\nx\n}"), "{\n\n  x\n\n}");
    }

    #[test]
    fn original_whitespace_after_break_is_kept_verbatim() {
        assert_eq!(reindent("{\n  x"), "{\n\n    x");
    }

    #[test]
    fn strings_are_not_special() {
        assert_eq!(reindent("s = \"a;b\""), "s = \"a;\nb\"");
    }

    #[test]
    fn trailing_break_has_no_indent() {
        assert_eq!(reindent("{"), "{\n");
        assert_eq!(reindent("{a;"), "{\n  a;\n");
    }
}
