//! Comment and directive scanners
//!
//! Each scanner is a single-pass state machine over raw source text. It yields
//! `(line, text)` pairs for comment bodies and for call idioms that carry
//! directives (localization lookups, A/B checks, inline i18n blocks). No
//! scanner builds a syntax tree and every loop is bounded by input length.
//!
//! Line numbers are 1-based. `\r\n`, `\r` and `\n` each count as exactly one
//! line break. Block comments spanning several physical lines produce one
//! [`Comment`] per line so diagnostics can point at the exact directive.

pub mod markup;
pub mod script;
pub mod stylesheet;

use serde::{Deserialize, Serialize};

/// A comment body, or a synthesized directive, found in source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// 1-based line the text was found on
    pub line: usize,
    /// Comment text without its delimiters
    pub value: String,
}

impl Comment {
    pub fn new(line: usize, value: impl Into<String>) -> Self {
        Self {
            line,
            value: value.into(),
        }
    }
}

/// The closed set of source languages that can carry directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentScanner {
    /// `//` and `/* */` comments plus `i18n.t(...)`, `AB.isOn(...)`, `AB.getVariant(...)`
    Script,
    /// `/* */` comments
    Stylesheet,
    /// `<!-- -->` comments plus `{{#i18n}}...{{/i18n}}` blocks
    Markup,
}

impl CommentScanner {
    /// Scan `source` and return every comment line and synthesized directive in order
    pub fn scan(self, source: &str) -> Vec<Comment> {
        match self {
            CommentScanner::Script => script::scan(source),
            CommentScanner::Stylesheet => stylesheet::scan(source),
            CommentScanner::Markup => markup::scan(source),
        }
    }
}

/// Byte cursor over source text that tracks the current line.
///
/// Every delimiter the scanners look for is ASCII, so slices taken between
/// delimiter positions always fall on UTF-8 boundaries.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn previous(&self) -> Option<u8> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.text.as_bytes().get(i).copied())
    }

    pub(crate) fn starts_with(&self, needle: &str) -> bool {
        self.text.as_bytes()[self.pos..].starts_with(needle.as_bytes())
    }

    pub(crate) fn at_newline(&self) -> bool {
        matches!(self.peek(), Some(b'\r' | b'\n'))
    }

    pub(crate) fn advance(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.text.len());
    }

    /// Step over one line break, treating `\r\n` as a single break
    pub(crate) fn consume_newline(&mut self) {
        if self.starts_with("\r\n") {
            self.advance(2);
        } else {
            self.advance(1);
        }
        self.line += 1;
    }

    /// Skip ASCII whitespace, counting any line breaks crossed
    pub(crate) fn skip_whitespace(&mut self) {
        while let Some(byte) = self.peek() {
            if byte == b'\r' || byte == b'\n' {
                self.consume_newline();
            } else if byte.is_ascii_whitespace() {
                self.advance(1);
            } else {
                break;
            }
        }
    }

    /// Skip a quoted literal starting at the opening quote.
    ///
    /// Stops after the closing quote, or at the end of the line when the
    /// literal is unterminated. Backslash escapes are honoured, including an
    /// escaped line break. With `multiline` set the literal may span lines.
    pub(crate) fn skip_quoted(&mut self, quote: u8, multiline: bool) {
        self.advance(1);
        while let Some(byte) = self.peek() {
            if byte == quote {
                self.advance(1);
                return;
            }
            match byte {
                b'\\' => {
                    self.advance(1);
                    if self.at_newline() {
                        self.consume_newline();
                    } else {
                        self.advance(1);
                    }
                }
                b'\r' | b'\n' if multiline => self.consume_newline(),
                b'\r' | b'\n' => return,
                _ => self.advance(1),
            }
        }
    }

    /// Skip a template literal starting at the opening backtick.
    ///
    /// The literal may span lines. Without a closing backtick anywhere in the
    /// rest of the text, only the backtick itself is stepped over.
    pub(crate) fn skip_template_literal(&mut self) {
        let (pos, line) = (self.pos, self.line);
        self.advance(1);
        while let Some(byte) = self.peek() {
            match byte {
                b'`' => {
                    self.advance(1);
                    return;
                }
                b'\\' => {
                    self.advance(1);
                    if self.at_newline() {
                        self.consume_newline();
                    } else {
                        self.advance(1);
                    }
                }
                b'\r' | b'\n' => self.consume_newline(),
                _ => self.advance(1),
            }
        }
        self.pos = pos + 1;
        self.line = line;
    }

    /// Nearest byte before the cursor that is not whitespace
    pub(crate) fn previous_significant(&self) -> Option<u8> {
        self.text.as_bytes()[..self.pos]
            .iter()
            .rev()
            .copied()
            .find(|byte| !byte.is_ascii_whitespace())
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end]
    }
}

/// Read a delimited block comment whose opening delimiter was already consumed.
///
/// Emits one [`Comment`] per physical line of the block. An unterminated block
/// runs to the end of the text.
pub(crate) fn block_comment(cursor: &mut Cursor<'_>, terminator: &str, out: &mut Vec<Comment>) {
    let mut start = cursor.pos();
    loop {
        if cursor.is_eof() {
            out.push(Comment::new(cursor.line(), cursor.slice(start, cursor.pos())));
            return;
        }
        if cursor.starts_with(terminator) {
            out.push(Comment::new(cursor.line(), cursor.slice(start, cursor.pos())));
            cursor.advance(terminator.len());
            return;
        }
        if cursor.at_newline() {
            out.push(Comment::new(cursor.line(), cursor.slice(start, cursor.pos())));
            cursor.consume_newline();
            start = cursor.pos();
        } else {
            cursor.advance(1);
        }
    }
}
