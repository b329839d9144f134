// Console backend - line-oriented terminal output

use std::io::{self, Write};
use std::path::PathBuf;

use console::Style;

use super::{Backend, ColorSpec};
use crate::config::ReporterOptions;
use crate::state::TestCase;

/// Writes plain or ANSI-styled text to a stream
pub struct ConsoleBackend<W: Write = io::Stdout> {
    out: W,
    colors: bool,
    base: Option<PathBuf>,
}

impl ConsoleBackend {
    /// Console backend on stdout
    pub fn stdout(options: &ReporterOptions) -> Self {
        Self::new(io::stdout(), options)
    }
}

impl<W: Write> ConsoleBackend<W> {
    pub fn new(out: W, options: &ReporterOptions) -> Self {
        Self {
            out,
            colors: options.color.enabled(),
            base: options.base.clone(),
        }
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Backend for ConsoleBackend<W> {
    fn print(&mut self, message: &str, newline: bool) {
        // Terminal output is best effort
        let _ = if newline {
            writeln!(self.out, "{}", message)
        } else {
            write!(self.out, "{}", message)
        };
        let _ = self.out.flush();
    }

    fn color(&self, spec: ColorSpec, text: &str) -> String {
        let style = Style::new().force_styling(self.colors);
        let style = match spec {
            ColorSpec::Red => style.red(),
            ColorSpec::Green => style.green(),
            ColorSpec::Cyan => style.cyan(),
            ColorSpec::Blue => style.blue(),
            ColorSpec::Yellow => style.yellow(),
            ColorSpec::Bold => style.bold(),
            ColorSpec::Dim => style.dim(),
        };
        style.apply_to(text).to_string()
    }

    fn link_to_test(&self, test: &TestCase, inline: bool) -> String {
        let quoted = shell_quote(&test.full_description());
        match &self.base {
            Some(base) if !inline => {
                format!("{} --filter {}", base.display(), quoted)
            }
            _ => quoted,
        }
    }
}

/// Single-quote for POSIX shells
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
