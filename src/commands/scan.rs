//! Scan command implementation
//!
//! Runs the bundle holding a file through its kind's pipeline and prints the
//! references, localization keys and A/B flags the file declares.

use std::path::{Path, PathBuf};

use console::Style;

use satchel::asset::{Asset, AssetReferenceType};
use satchel::bundle::{Bundle, BundleFactory, BundleKind};
use satchel::config::{CONFIG_FILE, SatchelConfig};
use satchel::error::{Result, config as config_error};
use satchel::pipeline::PipelineSet;

use crate::cli::ScanArgs;
use crate::commands::helpers::{app_path_for, resolve_root};

pub fn run(root: Option<PathBuf>, args: ScanArgs) -> Result<()> {
    let root = resolve_root(root)?;
    let app_path = app_path_for(&root, &args.file)?;
    let bundle = scan(&root, &app_path, args.kind.map(BundleKind::from))?;

    if let Some(asset) = bundle.find_asset(&app_path) {
        print_asset(asset);
    }
    Ok(())
}

/// Process the bundle `app_path` belongs to.
///
/// With a configuration in the root, that is the configured bundle containing
/// the file, so references to its neighbours classify as same-bundle.
/// Otherwise the file is processed as a bundle of its own.
pub fn scan(root: &Path, app_path: &str, kind: Option<BundleKind>) -> Result<Bundle> {
    let factory = BundleFactory::new(root);
    let config_path = root.join(CONFIG_FILE);
    let config = if config_path.is_file() {
        SatchelConfig::load(&config_path)?
    } else {
        SatchelConfig::default()
    };

    let configured = config
        .bundles
        .iter()
        .filter(|definition| kind.is_none_or(|k| k == definition.kind))
        .filter(|definition| is_within(app_path, &definition.path))
        .map(|definition| factory.create(definition))
        .find(|bundle| {
            bundle
                .as_ref()
                .map_or(true, |b| b.find_asset(app_path).is_some())
        })
        .transpose()?;

    let mut bundle = match configured {
        Some(bundle) => bundle,
        None => {
            let kind = match kind {
                Some(kind) => kind,
                None => infer_kind(app_path)?,
            };
            factory.create_for_file(app_path, kind)?
        }
    };
    tracing::debug!(bundle = bundle.path(), "scanning");

    PipelineSet::new(&config.settings).process(&mut bundle)?;
    Ok(bundle)
}

fn is_within(app_path: &str, bundle_path: &str) -> bool {
    let app_path = app_path.to_lowercase();
    let bundle_path = bundle_path.to_lowercase();
    app_path == bundle_path
        || app_path
            .strip_prefix(&bundle_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn infer_kind(app_path: &str) -> Result<BundleKind> {
    [
        BundleKind::Script,
        BundleKind::Stylesheet,
        BundleKind::HtmlTemplate,
    ]
    .into_iter()
    .find(|kind| kind.is_source(app_path))
    .ok_or_else(|| {
        config_error::invalid(format!(
            "Cannot tell the bundle kind of '{app_path}'; pass --kind"
        ))
    })
}

fn print_asset(asset: &dyn Asset) {
    println!("  {}", Style::new().bold().yellow().apply_to(asset.path()));

    if asset.references().is_empty() {
        println!(
            "    {} {}",
            Style::new().bold().apply_to("References:"),
            Style::new().dim().apply_to("None")
        );
    } else {
        println!("    {}", Style::new().bold().apply_to("References:"));
        for reference in asset.references() {
            println!(
                "      {:>4}  {} {}",
                reference.source_line,
                reference.path,
                Style::new().cyan().apply_to(reference_label(reference.kind))
            );
        }
    }

    if !asset.localized_strings().is_empty() {
        println!("    {}", Style::new().bold().apply_to("Localized strings:"));
        for localized in asset.localized_strings() {
            println!("      {:>4}  {}", localized.source_line, localized.name);
        }
    }

    if !asset.ab_configs().is_empty() {
        println!("    {}", Style::new().bold().apply_to("A/B configs:"));
        for config in asset.ab_configs() {
            println!("      {:>4}  {}", config.source_line, config.name);
        }
    }
}

fn reference_label(kind: AssetReferenceType) -> &'static str {
    match kind {
        AssetReferenceType::SameBundle => "(same bundle)",
        AssetReferenceType::DifferentBundle => "(bundle)",
        AssetReferenceType::Url => "(url)",
        AssetReferenceType::RawFilename => "(raw file)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel::error::SatchelError;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let file = root.join(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, content).unwrap();
    }

    #[test]
    fn test_scan_infers_stylesheet() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "styles/site.css",
            "/* @reference reset.css */\n.a { background: url('../img/a.png'); }",
        );

        let bundle = scan(temp.path(), "~/styles/site.css", None).unwrap();
        assert_eq!(bundle.kind(), BundleKind::Stylesheet);
        let references = bundle.assets()[0].references();
        assert_eq!(references[0].path, "~/styles/reset.css");
        assert_eq!(references[1].path, "~/img/a.png");
        assert_eq!(references[1].kind, AssetReferenceType::RawFilename);
    }

    #[test]
    fn test_scan_with_explicit_kind() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "views/item.tmpl", "<!-- @localize Item.Name -->");

        let bundle = scan(temp.path(), "~/views/item.tmpl", Some(BundleKind::HtmlTemplate)).unwrap();
        assert_eq!(bundle.assets()[0].localized_strings()[0].name, "Item.Name");
    }

    #[test]
    fn test_scan_uses_configured_bundle() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), CONFIG_FILE, "bundles:\n  - path: scripts\n    kind: script\n");
        write(temp.path(), "scripts/a.js", "// @reference b.js\n");
        write(temp.path(), "scripts/b.js", "");

        let bundle = scan(temp.path(), "~/scripts/a.js", None).unwrap();
        assert_eq!(bundle.path(), "~/scripts");
        let asset = bundle.find_asset("~/scripts/a.js").unwrap();
        assert_eq!(asset.references()[0].kind, AssetReferenceType::SameBundle);
    }

    #[test]
    fn test_scan_unknown_extension_needs_kind() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "notes.txt", "");
        let err = scan(temp.path(), "~/notes.txt", None).unwrap_err();
        assert!(matches!(err, SatchelError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_scan_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = scan(temp.path(), "~/missing.js", None).unwrap_err();
        assert!(matches!(err, SatchelError::FileNotFound { .. }));
    }
}
