//! Show command implementation

use std::path::PathBuf;

use console::Style;

use satchel::error::{Result, bundle as bundle_error};
use satchel::hash::to_hex;
use satchel::manifest::{BuildManifest, BundleManifest, MANIFEST_FILE};

use crate::cli::ShowArgs;
use crate::commands::helpers::resolve_root;

pub fn run(root: Option<PathBuf>, args: ShowArgs) -> Result<()> {
    let root = resolve_root(root)?;
    let manifest_path = args.manifest.unwrap_or_else(|| root.join(MANIFEST_FILE));
    let manifest = BuildManifest::read(&manifest_path)?;

    match args.bundle {
        Some(path) => {
            let bundle = manifest
                .find(&path)
                .ok_or_else(|| bundle_error::not_found(&path))?;
            println!();
            display_bundle(bundle, args.detailed);
        }
        None => {
            if manifest.bundles.is_empty() {
                println!("No bundles in manifest.");
                return Ok(());
            }
            println!("Bundles ({}):", manifest.bundles.len());
            println!();
            for bundle in &manifest.bundles {
                display_bundle(bundle, args.detailed);
                println!();
            }
        }
    }

    Ok(())
}

fn display_bundle(bundle: &BundleManifest, detailed: bool) {
    println!("  {}", Style::new().bold().yellow().apply_to(&bundle.path));
    println!(
        "    {} {}",
        Style::new().bold().apply_to("Kind:"),
        Style::new().green().apply_to(bundle.kind)
    );
    println!(
        "    {} {}",
        Style::new().bold().apply_to("Hash:"),
        to_hex(&bundle.hash)
    );
    if let Some(location) = &bundle.page_location {
        println!("    {} {}", Style::new().bold().apply_to("Page location:"), location);
    }
    if let Some(url) = &bundle.external_url {
        println!("    {} {}", Style::new().bold().apply_to("External URL:"), url);
    }
    println!("    {}", Style::new().bold().apply_to("HTML:"));
    for line in bundle.html.lines() {
        println!("      {}", Style::new().dim().apply_to(line));
    }

    print_list("References:", &bundle.references);
    print_list("Localized strings:", &bundle.localized_strings);
    print_list("A/B configs:", &bundle.ab_configs);

    println!(
        "    {} {}",
        Style::new().bold().apply_to("Assets:"),
        bundle.assets.len()
    );
    if detailed {
        for asset in &bundle.assets {
            println!("      - {}", Style::new().cyan().apply_to(&asset.path));
            for reference in &asset.references {
                println!(
                    "        {} {} (line {})",
                    Style::new().dim().apply_to("->"),
                    reference.path,
                    reference.source_line
                );
            }
        }
    }
}

fn print_list(title: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    println!("    {}", Style::new().bold().apply_to(title));
    for value in values {
        println!("      - {value}");
    }
}
