//! Bundle-related errors

use super::SatchelError;

/// Creates a bundle not found error
pub fn not_found(path: impl Into<String>) -> SatchelError {
    SatchelError::BundleNotFound { path: path.into() }
}

/// Creates an error for a bundle used before its hash was assigned
pub fn not_processed(path: impl Into<String>) -> SatchelError {
    SatchelError::BundleNotProcessed { path: path.into() }
}

/// Creates a circular reference error from the offending chain of bundle paths
pub fn circular(chain: &[String]) -> SatchelError {
    SatchelError::CircularReference {
        chain: chain.join(" -> "),
    }
}

/// Creates an invalid glob error
pub fn invalid_glob(pattern: impl Into<String>, reason: impl Into<String>) -> SatchelError {
    SatchelError::InvalidGlob {
        pattern: pattern.into(),
        reason: reason.into(),
    }
}

/// Creates a transform failed error
pub fn transform_failed(path: impl Into<String>, reason: impl Into<String>) -> SatchelError {
    SatchelError::TransformFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
