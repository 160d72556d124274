//! Terminal emitter.
//!
//! Human-readable diagnostic output with optional ANSI colors and two
//! levels of detail:
//! - terse: header, primary location, depth of the call chain
//! - verbose: every label, a source snippet, each call of the chain and notes

use std::io::{self, Write};

use sable_ir::Span;

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;

mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const CALL: &str = "\x1b[1;36m"; // Bold cyan
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Color output mode for the terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Use colors when the output is a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean; `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// How much of a diagnostic to print.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    #[default]
    Terse,
    Verbose,
}

/// Source text used to turn byte spans into `path:line:col`.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
    table: LineOffsetTable,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let table = LineOffsetTable::build(&text);
        SourceFile {
            path: path.into(),
            text,
            table,
        }
    }

    fn location(&self, span: Span) -> String {
        let (line, col) = self.table.offset_to_line_col(&self.text, span.start);
        format!("{}:{line}:{col}", self.path)
    }

    fn snippet(&self, span: Span) -> Option<(u32, &str, usize, usize)> {
        let (line, col) = self.table.offset_to_line_col(&self.text, span.start);
        let text = self.table.line_text(&self.text, line)?;
        let width = self
            .text
            .get(span.to_range())
            .map_or(1, |s| s.lines().next().map_or(1, |l| l.chars().count().max(1)));
        Some((line, text, col as usize - 1, width))
    }
}

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    verbosity: Verbosity,
    source: Option<SourceFile>,
}

impl TerminalEmitter<io::Stderr> {
    /// Create a terminal emitter for stderr.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            verbosity: Verbosity::Terse,
            source: None,
        }
    }

    #[must_use]
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn source(mut self, source: SourceFile) -> Self {
        self.source = Some(source);
        self
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_code(&mut self, code: &str) {
        if self.colors {
            let _ = write!(self.writer, "{}[{code}]{}", colors::BOLD, colors::RESET);
        } else {
            let _ = write!(self.writer, "[{code}]");
        }
    }

    fn location(&self, span: Span) -> String {
        match &self.source {
            Some(source) => source.location(span),
            None => span.to_string(),
        }
    }

    fn write_snippet(&mut self, span: Span) {
        let Some((line, text, col, width)) =
            self.source.as_ref().and_then(|s| s.snippet(span))
        else {
            return;
        };
        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());
        let text = text.to_owned();
        let _ = writeln!(self.writer, "{pad} |");
        let _ = writeln!(self.writer, "{gutter} | {text}");
        let _ = write!(self.writer, "{pad} | {}", " ".repeat(col));
        self.write_colored(&"^".repeat(width), colors::ERROR);
        let _ = writeln!(self.writer);
    }

    fn write_trailer(&mut self, kind: &str, color: &str, text: &str) {
        let _ = write!(self.writer, "  = ");
        self.write_colored(kind, color);
        let _ = writeln!(self.writer, ": {text}");
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.write_colored("error", colors::ERROR);
        self.write_code(diagnostic.code.as_str());
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        let verbose = self.verbosity == Verbosity::Verbose;
        for label in &diagnostic.labels {
            if !verbose && !label.is_primary {
                continue;
            }
            let marker = if label.is_primary { "-->" } else { "   " };
            let location = self.location(label.span);
            let _ = write!(self.writer, "  {marker} {location}: ");
            let color = if label.is_primary {
                colors::ERROR
            } else {
                colors::SECONDARY
            };
            self.write_colored(&label.message, color);
            let _ = writeln!(self.writer);
            if verbose && label.is_primary {
                self.write_snippet(label.span);
            }
        }

        if verbose {
            for site in &diagnostic.call_chain {
                let location = self.location(site.span);
                let _ = write!(self.writer, "  = ");
                self.write_colored("in", colors::CALL);
                let _ = writeln!(self.writer, " {} at {location}", site.call);
            }
            for note in &diagnostic.notes {
                self.write_trailer("note", colors::BOLD, note);
            }
        } else if !diagnostic.call_chain.is_empty() {
            let count = diagnostic.call_chain.len();
            let plural = if count == 1 { "" } else { "s" };
            let text = format!("{count} active call{plural}, --verbose lists them");
            self.write_trailer("note", colors::BOLD, &text);
        }
        for suggestion in &diagnostic.suggestions {
            self.write_trailer("help", colors::HELP, suggestion);
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
