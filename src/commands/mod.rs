//! Command implementations for Satchel CLI

pub mod build;
pub mod completions;
pub mod helpers;
pub mod scan;
pub mod show;
pub mod version;
