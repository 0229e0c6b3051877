//! Directive parsing
//!
//! Turns scanner output into typed, positioned references. A directive is a
//! comment that, after trimming and dropping one trailing `;`, starts with
//! `@reference`, `@localize` or `@abconfig`. The rest of the line is a list of
//! paths, each either quoted (`'a.js'`, `"a.js"`) or raw (up to whitespace).
//!
//! Script sources additionally accept XML documentation tags such as
//! `/// <reference path="lib.js" />` anywhere in a comment.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, directive};
use crate::scanner::{Comment, CommentScanner};

const REFERENCE_PREFIX: &str = "@reference";
const LOCALIZE_PREFIX: &str = "@localize";
const AB_CONFIG_PREFIX: &str = "@abconfig";

static XML_DOC_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<reference\s+path\s*=\s*(?:"([^"]*)"|'([^']*)')\s*/?>"#)
        .unwrap_or_else(|e| unreachable!("invalid XML reference pattern: {e}"))
});

/// What a parsed directive points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `@reference`: another asset, bundle or URL
    Asset,
    /// `@localize`: a localization key
    LocalizedString,
    /// `@abconfig`: an A/B configuration flag
    AbConfig,
}

/// A single path or name found in a directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    pub kind: DirectiveKind,
    pub path: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    InSingleQuote,
    InDoubleQuote,
    InRawPath,
}

/// Parses directives out of source text for one source language
#[derive(Debug, Clone, Copy)]
pub struct ReferenceParser {
    scanner: CommentScanner,
}

impl ReferenceParser {
    pub fn new(scanner: CommentScanner) -> Self {
        Self { scanner }
    }

    /// Scan `code` and parse every directive it carries.
    ///
    /// `source_path` only names the file in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SatchelError::MalformedDirective`] when a quoted
    /// path is not closed before the end of its line.
    pub fn parse(&self, code: &str, source_path: &str) -> Result<Vec<ParsedReference>> {
        let mut references = Vec::new();
        for comment in self.scanner.scan(code) {
            references.extend(self.parse_comment(&comment, source_path)?);
        }
        Ok(references)
    }

    fn parse_comment(&self, comment: &Comment, source_path: &str) -> Result<Vec<ParsedReference>> {
        let mut references = parse_directive(&comment.value, comment.line, source_path)?;
        if self.scanner == CommentScanner::Script {
            references.extend(parse_xml_doc_references(&comment.value, comment.line));
        }
        Ok(references)
    }
}

/// Parse one comment body as a directive.
///
/// Comments without a recognized prefix yield nothing.
///
/// # Errors
///
/// Fails when a quoted path is left open at the end of the text.
pub fn parse_directive(
    comment: &str,
    line: usize,
    source_path: &str,
) -> Result<Vec<ParsedReference>> {
    let trimmed = comment.trim();
    let text = trimmed.strip_suffix(';').unwrap_or(trimmed);

    let (kind, rest) = if let Some(rest) = text.strip_prefix(REFERENCE_PREFIX) {
        (DirectiveKind::Asset, rest)
    } else if let Some(rest) = text.strip_prefix(LOCALIZE_PREFIX) {
        (DirectiveKind::LocalizedString, rest)
    } else if let Some(rest) = text.strip_prefix(AB_CONFIG_PREFIX) {
        (DirectiveKind::AbConfig, rest)
    } else {
        return Ok(Vec::new());
    };

    let mut references = Vec::new();
    let mut push = |path: &str| {
        references.push(ParsedReference {
            kind,
            path: path.to_string(),
            line,
        });
    };

    let mut state = State::None;
    let mut start = 0;
    for (i, c) in rest.char_indices() {
        match state {
            State::None => {
                if c.is_whitespace() {
                    continue;
                }
                (state, start) = match c {
                    '"' => (State::InDoubleQuote, i + 1),
                    '\'' => (State::InSingleQuote, i + 1),
                    _ => (State::InRawPath, i),
                };
            }
            State::InSingleQuote if c == '\'' => {
                push(&rest[start..i]);
                state = State::None;
            }
            State::InDoubleQuote if c == '"' => {
                push(&rest[start..i]);
                state = State::None;
            }
            State::InRawPath if c.is_whitespace() => {
                push(&rest[start..i]);
                state = State::None;
            }
            _ => {}
        }
    }

    match state {
        State::InRawPath => push(&rest[start..]),
        State::InDoubleQuote => return Err(directive::unterminated_quote(source_path, line, '"')),
        State::InSingleQuote => return Err(directive::unterminated_quote(source_path, line, '\'')),
        State::None => {}
    }

    Ok(references)
}

fn parse_xml_doc_references(comment: &str, line: usize) -> impl Iterator<Item = ParsedReference> + '_ {
    XML_DOC_REFERENCE.captures_iter(comment).filter_map(move |captures| {
        captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|path| ParsedReference {
                kind: DirectiveKind::Asset,
                path: path.as_str().to_string(),
                line,
            })
    })
}
