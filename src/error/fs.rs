//! File system errors

use super::SatchelError;

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> SatchelError {
    SatchelError::FileNotFound { path: path.into() }
}

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> SatchelError {
    SatchelError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> SatchelError {
    SatchelError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a path outside root error
pub fn outside_root(path: impl Into<String>) -> SatchelError {
    SatchelError::PathOutsideRoot { path: path.into() }
}
