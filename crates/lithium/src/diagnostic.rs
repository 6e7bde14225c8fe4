//! Rich diagnostic rendering inspired by Rust's compiler, carried over from
//! the teacher's own diagnostic module: source snippets, underlines, notes
//! and help suggestions rather than a bare one-line message.

use std::fmt;

use crate::error::LithiumError;

/// A span in the source code (byte offsets).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span, used when only a line number (not a byte range)
    /// is known — e.g. an error surfaced from the scanner's line counter.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

/// A label attached to a span with a message.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A rich diagnostic error with source context.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub source: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Build a diagnostic from a `LithiumError` and the source it was
    /// raised against, pointing at the start of the offending line.
    pub fn from_error(error: &LithiumError, source: &str) -> Self {
        let offset = line_start_offset(source, error.line);
        let line_len = source[offset..].lines().next().unwrap_or("").len();
        let end = offset + line_len.max(1);
        Diagnostic::new(error.message.clone())
            .with_source(source)
            .with_label(Span::new(offset, end), error.kind.to_string())
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in self.source.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    fn get_line(&self, line_num: usize) -> &str {
        self.source.lines().nth(line_num - 1).unwrap_or("")
    }

    fn line_number_width(&self) -> usize {
        let max_line = self.source.lines().count();
        max_line.to_string().len().max(1)
    }
}

/// `line` is 0-indexed, matching `Scanner::line()` everywhere else in the
/// crate (see SPEC_FULL §4.1).
fn line_start_offset(source: &str, line: usize) -> usize {
    source.lines().take(line).map(|l| l.len() + 1).sum()
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if self.source.is_empty() || self.labels.is_empty() {
            for note in &self.notes {
                writeln!(f, "  = note: {note}")?;
            }
            for help in &self.help {
                writeln!(f, "  = help: {help}")?;
            }
            return Ok(());
        }

        let width = self.line_number_width();

        let mut labels_by_line: std::collections::BTreeMap<usize, Vec<&Label>> =
            std::collections::BTreeMap::new();
        for label in &self.labels {
            let (line, _) = self.offset_to_line_col(label.span.start);
            labels_by_line.entry(line).or_default().push(label);
        }

        writeln!(f, "{:width$} |", "", width = width)?;

        for (&line_num, labels) in &labels_by_line {
            let line_content = self.get_line(line_num);
            writeln!(f, "{:width$} | {}", line_num, line_content, width = width)?;

            for label in labels {
                let (_, start_col) = self.offset_to_line_col(label.span.start);
                let (_, end_col) = self.offset_to_line_col(label.span.end);

                let underline_start = start_col - 1;
                let underline_len = (end_col - start_col).max(1);
                let underline_char = if label.is_primary { '^' } else { '-' };

                write!(f, "{:width$} | ", "", width = width)?;
                write!(f, "{:underline_start$}", "")?;
                for _ in 0..underline_len {
                    write!(f, "{underline_char}")?;
                }
                if !label.message.is_empty() {
                    write!(f, " {}", label.message)?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f, "{:width$} |", "", width = width)?;

        for note in &self.notes {
            writeln!(f, "  = note: {note}")?;
        }
        for help in &self.help {
            writeln!(f, "  = help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn simple_diagnostic_renders_underline() {
        let diag = Diagnostic::new("type mismatch")
            .with_source("set x \"hi\"")
            .with_label(Span::new(6, 10), "expected `int`, found `string`")
            .with_note("x was declared as int")
            .with_help("use an integer literal instead");

        let output = diag.to_string();
        assert!(output.contains("error: type mismatch"));
        assert!(output.contains("set x \"hi\""));
        assert!(output.contains("^^^^"));
        assert!(output.contains("note:"));
        assert!(output.contains("help:"));
    }

    #[test]
    fn from_error_points_at_the_offending_line() {
        let source = "int x 1\nset x \"hi\"\n";
        // A real `Scanner::line()` is 0-indexed: by the time the scanner has
        // read past the first newline onto the "set x \"hi\"" line, it
        // reports line 1, not line 2.
        let err = LithiumError::new(ErrorKind::Type, 1, "initializer type mismatch");
        let diag = Diagnostic::from_error(&err, source);
        let output = diag.to_string();
        assert!(output.contains("set x \"hi\""));
        assert!(output.contains("TypeError"));
    }
}
