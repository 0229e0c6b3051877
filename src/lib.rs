//! Satchel - front-end asset bundler
//!
//! Groups script, stylesheet and html template sources into bundles, follows
//! the `@reference` directives inside them to order bundles by dependency, and
//! writes a manifest with content hashes and ready-to-use HTML tags.

pub mod asset;
pub mod bundle;
pub mod config;
pub mod error;
pub mod graph;
pub mod hash;
pub mod manifest;
pub mod pipeline;
pub mod reference;
pub mod scanner;
pub mod url;

pub use bundle::{Bundle, BundleKind};
pub use error::{Result, SatchelError};
pub use graph::BundleCollection;
