//! Manifest errors

use super::SatchelError;

/// Creates the error raised when content is requested from a manifest stand-in
pub fn unsupported(operation: impl Into<String>, path: impl Into<String>) -> SatchelError {
    SatchelError::UnsupportedOperation {
        operation: operation.into(),
        path: path.into(),
    }
}

/// Creates a manifest parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> SatchelError {
    SatchelError::ManifestParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
