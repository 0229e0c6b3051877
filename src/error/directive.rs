//! Directive errors

use super::SatchelError;

/// Creates an error for a quoted directive path that never closes
pub fn unterminated_quote(path: impl Into<String>, line: usize, quote: char) -> SatchelError {
    let name = if quote == '"' { "double" } else { "single" };
    SatchelError::MalformedDirective {
        path: path.into(),
        line,
        reason: format!("Missing closing {name} quote ({quote})."),
    }
}
