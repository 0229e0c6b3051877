//! CLI definitions using clap derive API
//!
//! Argument types for each command live in their own submodule.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod completions;
pub mod scan;
pub mod show;

pub use build::BuildArgs;
pub use completions::CompletionsArgs;
pub use scan::ScanArgs;
pub use show::ShowArgs;

/// Satchel - front-end asset bundler
#[derive(Parser, Debug)]
#[command(
    name = "satchel",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Front-end asset bundler",
    long_about = "Satchel groups scripts, stylesheets and html templates into bundles, \
                  orders them by their @reference directives and writes a manifest of \
                  content-hashed URLs and HTML tags.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  satchel build                        \x1b[90m# Build satchel.yaml in the current directory\x1b[0m\n   \
                  satchel -r site build -o out.json    \x1b[90m# Build another root to a custom manifest\x1b[0m\n   \
                  satchel scan scripts/app/main.js     \x1b[90m# Show the directives of one file\x1b[0m\n   \
                  satchel show ~/scripts/app           \x1b[90m# Show a bundle from the manifest\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Application root (defaults to current directory)
    #[arg(long, short = 'r', global = true, env = "SATCHEL_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process every configured bundle and write the manifest
    Build(BuildArgs),

    /// List the directives found in a single source file
    Scan(ScanArgs),

    /// Show bundles recorded in a manifest
    Show(ShowArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
