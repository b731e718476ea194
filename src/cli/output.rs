//! Colored terminal output for release runs
//!
//! Operator-facing messages go through [`OutputManager`]; stage progress is
//! reported through the `log` facade instead.

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose)
    }
}

impl OutputManager {
    /// Create a new output manager writing to stderr, next to the log output
    pub fn new(verbose: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stderr(ColorChoice::Auto),
            verbose,
        }
    }

    fn emit(&self, symbol: &str, symbol_spec: Option<&ColorSpec>, message: &str) {
        let mut buffer = self.bufwtr.buffer();
        if let Some(spec) = symbol_spec {
            let _ = buffer.set_color(spec);
        }
        let _ = write!(&mut buffer, "{symbol}");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {message}");
        if self.bufwtr.print(&buffer).is_err() {
            eprintln!("{symbol} {message}");
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit(
            "✓",
            Some(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true)),
            message,
        );
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.emit(
            "⚠",
            Some(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true)),
            message,
        );
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        self.emit(
            "✗",
            Some(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true)),
            message,
        );
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) {
        self.emit("•", Some(ColorSpec::new().set_fg(Some(Color::Cyan))), message);
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) {
        self.emit("   ", None, message);
    }

    /// Print a plain message
    pub fn println(&self, message: &str) {
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{message}");
        if self.bufwtr.print(&buffer).is_err() {
            eprintln!("{message}");
        }
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
