//! Markup-family scanner for HTML templates
//!
//! Recognizes `<!-- -->` comments and mustache inline-localization blocks.
//! A block opened by `{{#i18n}}` or `{{# i18n }}` and closed by `{{/i18n}}`
//! or `{{/ i18n }}` (spellings may be mixed) becomes a single
//! `@localize <key>` with the trimmed key, tagged with the opening line.

use super::{Comment, Cursor, block_comment};

const LOCALIZE_OPEN: [&str; 2] = ["{{#i18n}}", "{{# i18n }}"];
const LOCALIZE_CLOSE: [&str; 2] = ["{{/i18n}}", "{{/ i18n }}"];

pub fn scan(source: &str) -> Vec<Comment> {
    let mut cursor = Cursor::new(source);
    let mut comments = Vec::new();

    while !cursor.is_eof() {
        if cursor.at_newline() {
            cursor.consume_newline();
        } else if cursor.starts_with("<!--") {
            cursor.advance(4);
            block_comment(&mut cursor, "-->", &mut comments);
        } else if let Some(open) = find_delimiter(&cursor, &LOCALIZE_OPEN) {
            cursor.advance(open.len());
            if let Some(comment) = localize_block(&mut cursor) {
                comments.push(comment);
            }
        } else {
            cursor.advance(1);
        }
    }

    comments
}

fn find_delimiter(cursor: &Cursor<'_>, delimiters: &[&'static str]) -> Option<&'static str> {
    delimiters
        .iter()
        .copied()
        .find(|delimiter| cursor.starts_with(delimiter))
}

/// Read up to the closing i18n tag. An unclosed block yields nothing.
fn localize_block(cursor: &mut Cursor<'_>) -> Option<Comment> {
    let line = cursor.line();
    let start = cursor.pos();

    while !cursor.is_eof() {
        if let Some(close) = find_delimiter(cursor, &LOCALIZE_CLOSE) {
            let key = cursor.slice(start, cursor.pos()).trim();
            cursor.advance(close.len());
            return Some(Comment::new(line, format!("@localize {key}")));
        }
        if cursor.at_newline() {
            cursor.consume_newline();
        } else {
            cursor.advance(1);
        }
    }

    None
}
