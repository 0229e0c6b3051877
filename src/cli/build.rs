use clap::Parser;
use std::path::PathBuf;

/// Arguments for the build command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Build using ./satchel.yaml:\n    satchel build\n\n\
                  Use another configuration file:\n    satchel build --config site/bundles.yaml\n\n\
                  Embed bundle content in the manifest:\n    satchel build --include-content")]
pub struct BuildArgs {
    /// Configuration file (defaults to satchel.yaml in the root)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Manifest output path (defaults to satchel-manifest.json in the root)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Store bundle content in the manifest
    #[arg(long)]
    pub include_content: bool,
}
