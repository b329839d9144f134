// HTML backend - renders the report as a document for a browser view

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;

use super::{Backend, ColorSpec};
use crate::config::ReporterOptions;
use crate::state::TestCase;

const STYLESHEET: &str = "\
body { font-family: monospace; white-space: pre; }
.red { color: #c0392b; } .green { color: #27ae60; } .cyan { color: #16a085; }
.blue { color: #2980b9; } .yellow { color: #b7950b; }
.bold { font-weight: bold; } .dim { opacity: 0.6; }";

/// Collects printed lines as HTML elements.
///
/// Fragments returned by `color` and `link_to_test` are already markup and
/// pass through `print` untouched; any other text is escaped, including
/// text that merely looks like a fragment.
pub struct HtmlBackend {
    title: String,
    colors: bool,
    base: Option<PathBuf>,
    head: String,
    lines: Vec<String>,
    partial: String,
    issued: RefCell<HashSet<String>>,
}

impl HtmlBackend {
    pub fn new(title: impl Into<String>, options: &ReporterOptions) -> Self {
        Self {
            title: title.into(),
            // A page can always style; only an explicit "never" turns it off
            colors: options.color != crate::config::ColorChoice::Never,
            base: options.base.clone(),
            head: String::new(),
            lines: Vec::new(),
            partial: String::new(),
            issued: RefCell::new(HashSet::new()),
        }
    }

    /// Body lines rendered so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Close any open line and wrap everything into a standalone page
    pub fn finish(mut self) -> String {
        if !self.partial.is_empty() {
            self.flush_line();
        }

        let mut page = String::from("<!DOCTYPE html>\n<html>\n");
        page.push_str(&self.head);
        page.push_str("<body>\n");
        for line in &self.lines {
            page.push_str(line);
            page.push('\n');
        }
        page.push_str("</body>\n</html>\n");
        page
    }

    fn fragment(&self, markup: String) -> String {
        let marked = format!("{}{}{}", FRAGMENT_OPEN, markup, FRAGMENT_CLOSE);
        self.issued.borrow_mut().insert(markup);
        marked
    }

    /// Escape plain text; only spans this backend issued pass through
    fn escape_text(&self, message: &str) -> String {
        let issued = self.issued.borrow();
        let mut out = String::with_capacity(message.len());
        let mut rest = message;
        while let Some(start) = rest.find(FRAGMENT_OPEN) {
            out.push_str(&escape(&rest[..start]));
            let after = &rest[start + FRAGMENT_OPEN.len_utf8()..];
            match after.find(FRAGMENT_CLOSE) {
                Some(end) if issued.contains(&after[..end]) => {
                    out.push_str(&after[..end]);
                    rest = &after[end + FRAGMENT_CLOSE.len_utf8()..];
                }
                _ => rest = after,
            }
        }
        out.push_str(&escape(rest));
        out
    }

    fn flush_line(&mut self) {
        let content = std::mem::take(&mut self.partial);
        self.lines.push(format!("<div class=\"line\">{}</div>", content));
    }
}

impl Backend for HtmlBackend {
    fn print(&mut self, message: &str, newline: bool) {
        let text = self.escape_text(message);
        self.partial.push_str(&text);
        if newline {
            self.flush_line();
        }
    }

    fn color(&self, spec: ColorSpec, text: &str) -> String {
        if !self.colors {
            return self.fragment(escape(text));
        }
        self.fragment(format!(
            "<span class=\"{}\">{}</span>",
            spec.name(),
            escape(text)
        ))
    }

    fn link_to_test(&self, test: &TestCase, inline: bool) -> String {
        let description = test.full_description();
        let href = match &self.base {
            Some(base) if !inline => format!(
                "{}?filter={}",
                base.display(),
                percent_encode(&description)
            ),
            _ => format!("#test-{}", slug(&description)),
        };
        self.fragment(format!(
            "<a class=\"test-link\" href=\"{}\">{}</a>",
            escape(&href),
            escape(&description)
        ))
    }

    fn suite_begin(&mut self) {
        self.head = format!(
            "<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n",
            escape(&self.title),
            STYLESHEET
        );
        self.lines.clear();
        self.partial.clear();
    }
}

// Rendered fragments travel through `print` as text, so they are tagged
// with private-use delimiters. `print` unwraps a tagged span only when its
// markup was issued by the same backend.
const FRAGMENT_OPEN: char = '\u{E000}';
const FRAGMENT_CLOSE: char = '\u{E001}';

/// HTML entity escaping. Fragment delimiters are dropped.
pub fn escape(text: &str) -> String {
    text.replace([FRAGMENT_OPEN, FRAGMENT_CLOSE], "")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
