//! Script-family scanner
//!
//! Recognizes `//` line comments, `/* */` block comments, and the call idioms
//! `i18n.t('key')`, `AB.isOn('name')` and `AB.getVariant('name')`. A call idiom
//! whose sole argument is a string literal is re-emitted as `@localize key` or
//! `@abconfig name`, tagged with the line of the opening quote. Anything else
//! (`i18n.t(s)`, `typeof i18n.t`) is ordinary code and yields nothing.

use super::{Comment, Cursor, block_comment};

const LOCALIZE: &str = "@localize";
const AB_CONFIG: &str = "@abconfig";

/// Call prefixes and the directive each one synthesizes
const CALL_IDIOMS: &[(&str, &str)] = &[
    ("i18n.t(", LOCALIZE),
    ("AB.isOn(", AB_CONFIG),
    ("AB.getVariant(", AB_CONFIG),
];

pub fn scan(source: &str) -> Vec<Comment> {
    let mut cursor = Cursor::new(source);
    let mut comments = Vec::new();

    while let Some(byte) = cursor.peek() {
        match byte {
            b'\r' | b'\n' => cursor.consume_newline(),
            b'/' if cursor.starts_with("//") => {
                cursor.advance(2);
                comments.push(line_comment(&mut cursor));
            }
            b'/' if cursor.starts_with("/*") => {
                cursor.advance(2);
                block_comment(&mut cursor, "*/", &mut comments);
            }
            b'\'' | b'"' => cursor.skip_quoted(byte, false),
            b'`' => cursor.skip_template_literal(),
            b'/' if starts_regex_literal(&cursor) => skip_regex_literal(&mut cursor),
            _ => match call_idiom_at(&cursor) {
                Some((call, directive)) => {
                    cursor.advance(call.len());
                    if let Some(comment) = literal_argument(&mut cursor, directive) {
                        comments.push(comment);
                    }
                }
                None => cursor.advance(1),
            },
        }
    }

    comments
}

fn line_comment(cursor: &mut Cursor<'_>) -> Comment {
    let line = cursor.line();
    let start = cursor.pos();
    while !cursor.is_eof() && !cursor.at_newline() {
        cursor.advance(1);
    }
    Comment::new(line, cursor.slice(start, cursor.pos()))
}

/// A `/` opens a regex literal where an operand is expected: at the start of
/// input or after an operator or opening punctuation.
fn starts_regex_literal(cursor: &Cursor<'_>) -> bool {
    cursor.previous_significant().is_none_or(|byte| {
        matches!(
            byte,
            b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}' | b';'
                | b'+' | b'-' | b'*' | b'%' | b'<' | b'>' | b'~' | b'^'
        )
    })
}

/// Skip a regex literal from its opening `/` up to the closing `/` outside a
/// character class. An unterminated literal stops at the end of the line.
fn skip_regex_literal(cursor: &mut Cursor<'_>) {
    cursor.advance(1);
    let mut in_class = false;
    while let Some(byte) = cursor.peek() {
        match byte {
            b'\r' | b'\n' => return,
            b'\\' => {
                cursor.advance(1);
                if !cursor.at_newline() {
                    cursor.advance(1);
                }
            }
            b'[' => {
                in_class = true;
                cursor.advance(1);
            }
            b']' => {
                in_class = false;
                cursor.advance(1);
            }
            b'/' if !in_class => {
                cursor.advance(1);
                return;
            }
            _ => cursor.advance(1),
        }
    }
}

fn call_idiom_at(cursor: &Cursor<'_>) -> Option<(&'static str, &'static str)> {
    if cursor.previous().is_some_and(is_identifier_byte) {
        return None;
    }
    CALL_IDIOMS
        .iter()
        .copied()
        .find(|(call, _)| cursor.starts_with(call))
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'$' | b'.')
}

/// Read the sole string-literal argument of a call whose `(` was just consumed.
///
/// Returns `None` without backtracking when the argument is not a single
/// literal; the cursor is then left on the first unexpected byte.
fn literal_argument(cursor: &mut Cursor<'_>, directive: &str) -> Option<Comment> {
    cursor.skip_whitespace();
    let quote = match cursor.peek() {
        Some(quote @ (b'\'' | b'"')) => quote,
        _ => return None,
    };
    let line = cursor.line();
    cursor.advance(1);
    let start = cursor.pos();

    loop {
        match cursor.peek() {
            None | Some(b'\r' | b'\n') => return None,
            Some(byte) if byte == quote => break,
            Some(b'\\') => {
                cursor.advance(1);
                if cursor.at_newline() {
                    return None;
                }
                cursor.advance(1);
            }
            Some(_) => cursor.advance(1),
        }
    }
    let value = cursor.slice(start, cursor.pos());
    cursor.advance(1);

    cursor.skip_whitespace();
    if cursor.peek() != Some(b')') {
        return None;
    }
    cursor.advance(1);

    Some(Comment::new(line, format!("{directive} {value}")))
}
