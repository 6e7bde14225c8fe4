//! The source cursor shared by the number parser and the evaluator.
//!
//! Lithium has no separate tokenizing pass: the evaluator calls straight
//! into the scanner while it recognizes statements and expressions, so the
//! scanner's only job is to expose cheap, restartable cursor primitives
//! over the raw source bytes.

/// A byte-level cursor over a source buffer.
///
/// Operates on bytes rather than `char`s so that high-bit UTF-8 continuation
/// bytes pass through identifiers untouched without the scanner needing to
/// decode them.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a [u8],
    pos: usize,
    line: usize,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit() || b == b'_'
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 0,
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Look at the next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    /// Look `n` bytes ahead without consuming anything.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.source.get(self.pos + n).copied()
    }

    /// Consume and return the next byte, tracking newlines.
    pub fn get(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    /// Consume the next byte if it equals `b`.
    pub fn try_match(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.get();
            true
        } else {
            false
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Rewind (or fast-forward) the cursor to a previously saved position.
    ///
    /// Line numbers are not recomputed; jumping across a span does not
    /// retrace it, so error messages reported shortly after a rewind may
    /// show a drifted line.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Skip spaces, tabs, carriage returns, vertical tabs, and `%` line
    /// comments. Stops at (does not consume) a newline.
    pub fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(0x0b) => {
                    self.get();
                }
                Some(b'%') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.get();
                    }
                }
                _ => break,
            }
        }
    }

    /// Like [`Scanner::skip_whitespace`] but also consumes newlines.
    pub fn skip_whitespace_and_newline(&mut self) {
        loop {
            self.skip_whitespace();
            if self.peek() == Some(b'\n') {
                self.get();
            } else {
                break;
            }
        }
    }

    /// Read `[A-Za-z\x80-\xFF][A-Za-z0-9_\x80-\xFF]*` after skipping leading
    /// whitespace. Returns `false` (without consuming anything but the
    /// leading whitespace) if the next byte is not a valid identifier start.
    pub fn get_identifier(&mut self, out: &mut String) -> bool {
        self.skip_whitespace();
        let Some(first) = self.peek() else {
            return false;
        };
        if !is_ident_start(first) {
            return false;
        }
        out.clear();
        while let Some(b) = self.peek() {
            if !is_ident_continue(b) {
                break;
            }
            out.push(b as char);
            self.get();
        }
        true
    }

    /// Like [`Scanner::get_identifier`] but only letters/high-bit bytes are
    /// accepted, never digits or underscores — used for keyword recognition
    /// so a numeric suffix never glues onto a keyword.
    pub fn get_alpha_identifier(&mut self, out: &mut String) -> bool {
        self.skip_whitespace();
        let Some(first) = self.peek() else {
            return false;
        };
        if !is_ident_start(first) {
            return false;
        }
        out.clear();
        while let Some(b) = self.peek() {
            if !is_ident_start(b) {
                break;
            }
            out.push(b as char);
            self.get();
        }
        true
    }

    /// Read a double-quoted string literal. Expects the opening `"` to be
    /// the next non-whitespace byte. A `\` immediately before the closing
    /// quote makes that quote literal rather than terminating the literal;
    /// no other escape sequences are interpreted.
    pub fn get_string_literal(&mut self, out: &mut String) -> bool {
        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return false;
        }
        self.get();
        out.clear();
        loop {
            match self.get() {
                None => return false,
                Some(b'"') => return true,
                Some(b'\\') => {
                    if let Some(escaped) = self.get() {
                        out.push(escaped as char);
                    } else {
                        return false;
                    }
                }
                Some(b) => out.push(b as char),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_reads_high_bit_bytes() {
        let mut s = Scanner::new("  café 1");
        let mut out = String::new();
        assert!(s.get_identifier(&mut out));
        assert_eq!(out.as_bytes(), "caf\u{c3}\u{a9}".as_bytes());
    }

    #[test]
    fn skip_whitespace_stops_at_newline() {
        let mut s = Scanner::new("  % a comment\nnext");
        s.skip_whitespace();
        assert_eq!(s.peek(), Some(b'\n'));
    }

    #[test]
    fn skip_whitespace_and_newline_consumes_multiple_lines() {
        let mut s = Scanner::new("\n\n  x");
        s.skip_whitespace_and_newline();
        assert_eq!(s.peek(), Some(b'x'));
        assert_eq!(s.line(), 2);
    }

    #[test]
    fn string_literal_handles_escaped_quote() {
        let mut s = Scanner::new("\"he said \\\"hi\\\"\"");
        let mut out = String::new();
        assert!(s.get_string_literal(&mut out));
        assert_eq!(out, "he said \"hi\"");
    }

    #[test]
    fn get_alpha_identifier_rejects_leading_digit() {
        let mut s = Scanner::new("42abc");
        let mut out = String::new();
        assert!(!s.get_alpha_identifier(&mut out));
    }

    #[test]
    fn position_round_trips() {
        let mut s = Scanner::new("abcdef");
        s.get();
        s.get();
        let saved = s.position();
        s.get();
        s.set_position(saved);
        assert_eq!(s.peek(), Some(b'c'));
    }
}
