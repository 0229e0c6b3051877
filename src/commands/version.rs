//! Version command implementation

use satchel::error::Result;
use satchel::manifest::MANIFEST_VERSION;

/// Run version command
pub fn run() -> Result<()> {
    println!("satchel {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("  Profile: {}", build_profile());
    println!("  Manifest format: {MANIFEST_VERSION}");

    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
