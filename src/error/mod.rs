//! Error types and handling for Satchel
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`directive`]: Malformed directives found while scanning sources
//! - [`bundle`]: Bundle construction and processing errors
//! - [`manifest`]: Manifest persistence and stand-in misuse
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors

pub mod bundle;
pub mod config;
pub mod directive;
pub mod fs;
pub mod manifest;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Satchel operations
#[derive(Error, Diagnostic, Debug)]
pub enum SatchelError {
    // Directive errors
    #[error("Asset reference error in {path} line {line}. {reason}")]
    #[diagnostic(
        code(satchel::directive::malformed),
        help("Close the quoted path in the directive comment on that line")
    )]
    MalformedDirective {
        path: String,
        line: usize,
        reason: String,
    },

    // Bundle errors
    #[error("Bundle '{path}' not found")]
    #[diagnostic(
        code(satchel::bundle::not_found),
        help("Check that the bundle path is declared in satchel.yaml")
    )]
    BundleNotFound { path: String },

    #[error("Bundle '{path}' has not been processed")]
    #[diagnostic(
        code(satchel::bundle::not_processed),
        help("Run the bundle through the processing pipeline before rendering it")
    )]
    BundleNotProcessed { path: String },

    #[error("Circular bundle reference detected: {chain}")]
    #[diagnostic(
        code(satchel::bundle::circular),
        help("Remove one of the @reference directives that form the cycle")
    )]
    CircularReference { chain: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    #[diagnostic(code(satchel::bundle::invalid_glob))]
    InvalidGlob { pattern: String, reason: String },

    #[error("Raw file path must be application relative (starting with '~'): {path}")]
    #[diagnostic(code(satchel::bundle::invalid_raw_file_path))]
    InvalidRawFilePath { path: String },

    #[error("Failed to transform asset '{path}': {reason}")]
    #[diagnostic(code(satchel::bundle::transform_failed))]
    TransformFailed { path: String, reason: String },

    // Manifest errors
    #[error("Operation '{operation}' is not supported by asset '{path}' loaded from a manifest")]
    #[diagnostic(
        code(satchel::manifest::unsupported),
        help("Assets rebuilt from a manifest only carry metadata; rebuild from sources instead")
    )]
    UnsupportedOperation { operation: String, path: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(satchel::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(satchel::config::not_found),
        help("Create a satchel.yaml or pass --config")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(satchel::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(satchel::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(satchel::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(satchel::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(satchel::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Path leaves the application root: {path}")]
    #[diagnostic(
        code(satchel::fs::outside_root),
        help("Paths may not climb above the root with '..'")
    )]
    PathOutsideRoot { path: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(satchel::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for SatchelError {
    fn from(err: std::io::Error) -> Self {
        SatchelError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SatchelError {
    fn from(err: serde_yaml::Error) -> Self {
        SatchelError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SatchelError {
    fn from(err: serde_json::Error) -> Self {
        SatchelError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SatchelError>;
