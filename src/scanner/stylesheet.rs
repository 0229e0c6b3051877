//! Stylesheet scanner: `/* */` comments only

use super::{Comment, Cursor, block_comment};

pub fn scan(source: &str) -> Vec<Comment> {
    let mut cursor = Cursor::new(source);
    let mut comments = Vec::new();

    while let Some(byte) = cursor.peek() {
        match byte {
            b'\r' | b'\n' => cursor.consume_newline(),
            b'/' if cursor.starts_with("/*") => {
                cursor.advance(2);
                block_comment(&mut cursor, "*/", &mut comments);
            }
            b'\'' | b'"' => cursor.skip_quoted(byte, false),
            _ => cursor.advance(1),
        }
    }

    comments
}
