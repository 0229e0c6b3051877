use clap::{Parser, ValueEnum};
use satchel::BundleKind;
use std::path::PathBuf;

/// Bundle kind as spelled on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Script,
    Stylesheet,
    HtmlTemplate,
}

impl From<KindArg> for BundleKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Script => BundleKind::Script,
            KindArg::Stylesheet => BundleKind::Stylesheet,
            KindArg::HtmlTemplate => BundleKind::HtmlTemplate,
        }
    }
}

/// Arguments for the scan command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Scan a script:\n    satchel scan scripts/app/main.js\n\n\
                  Scan a file whose extension does not tell its kind:\n    \
                  satchel scan views/item.tmpl --kind html-template")]
pub struct ScanArgs {
    /// Source file, relative to the root
    pub file: PathBuf,

    /// Kind of bundle the file belongs to (inferred from the extension if omitted)
    #[arg(long, short = 'k', value_enum)]
    pub kind: Option<KindArg>,
}
