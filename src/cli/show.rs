use clap::Parser;
use std::path::PathBuf;

/// Arguments for the show command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List every bundle in the manifest:\n    satchel show\n\n\
                  Show one bundle with its assets:\n    satchel show ~/scripts/app --detailed\n\n\
                  Read another manifest:\n    satchel show --manifest out/satchel-manifest.json")]
pub struct ShowArgs {
    /// Bundle path to show (if omitted, lists all bundles)
    pub bundle: Option<String>,

    /// Manifest file (defaults to satchel-manifest.json in the root)
    #[arg(long, short = 'm')]
    pub manifest: Option<PathBuf>,

    /// Include assets and their references
    #[arg(long)]
    pub detailed: bool,
}
