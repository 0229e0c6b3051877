//! Build command implementation
//!
//! Loads the configuration, creates and processes every bundle, orders them by
//! dependency and writes the manifest.

use std::path::{Path, PathBuf};

use console::Style;

use satchel::BundleCollection;
use satchel::bundle::BundleFactory;
use satchel::config::{CONFIG_FILE, SatchelConfig};
use satchel::error::Result;
use satchel::hash::to_hex;
use satchel::manifest::{BuildManifest, BundleManifestBuilder, MANIFEST_FILE};
use satchel::pipeline::PipelineSet;
use satchel::url::UrlGenerator;

use crate::cli::BuildArgs;
use crate::commands::helpers::resolve_root;

pub fn run(root: Option<PathBuf>, args: BuildArgs) -> Result<()> {
    let root = resolve_root(root)?;
    let config_path = args.config.unwrap_or_else(|| root.join(CONFIG_FILE));
    let output = args.output.unwrap_or_else(|| root.join(MANIFEST_FILE));

    let manifest = build(&root, &config_path, args.include_content)?;
    manifest.write(&output)?;

    print_summary(&manifest, &output);
    Ok(())
}

/// Build the manifest for every bundle in `config_path`
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn build(root: &Path, config_path: &Path, include_content: bool) -> Result<BuildManifest> {
    let config = SatchelConfig::load(config_path)?;
    let settings = &config.settings;

    let factory = BundleFactory::new(root);
    let mut collection = BundleCollection::new(factory.create_all(&config.bundles)?);
    collection.process_all(&PipelineSet::new(settings))?;
    collection.sort_by_dependencies()?;

    let builder = BundleManifestBuilder::new(UrlGenerator::new(&settings.route_prefix))
        .include_content(include_content || settings.include_content);
    let bundles = builder.build_all(collection.bundles())?;

    tracing::info!(bundles = bundles.len(), "build complete");
    Ok(BuildManifest::new(bundles))
}

fn print_summary(manifest: &BuildManifest, output: &Path) {
    for bundle in &manifest.bundles {
        let hash = to_hex(&bundle.hash);
        println!(
            "  {} {} {}",
            Style::new().bold().yellow().apply_to(&bundle.path),
            Style::new().cyan().apply_to(bundle.kind),
            Style::new().dim().apply_to(hash.get(..12).unwrap_or(&hash)),
        );
    }
    println!();
    println!(
        "{} {} bundle(s) to {}",
        Style::new().bold().green().apply_to("Wrote"),
        manifest.bundles.len(),
        output.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel::BundleKind;
    use satchel::error::SatchelError;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let file = root.join(path);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, content).unwrap();
    }

    #[test]
    fn test_build_orders_bundles_by_reference() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            CONFIG_FILE,
            "bundles:\n  - path: scripts/app\n    kind: script\n  - path: scripts/lib\n    kind: script\n",
        );
        write(root, "scripts/app/main.js", "// @reference ~/scripts/lib\nlib();");
        write(root, "scripts/lib/lib.js", "function lib() {}");

        let manifest = build(root, &root.join(CONFIG_FILE), false).unwrap();
        let paths: Vec<_> = manifest.bundles.iter().map(|b| b.path.as_str()).collect();
        assert_eq!(paths, vec!["~/scripts/lib", "~/scripts/app"]);
        assert_eq!(manifest.bundles[0].kind, BundleKind::Script);
        assert!(manifest.bundles[0].content.is_none());
    }

    #[test]
    fn test_build_setting_includes_content() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            CONFIG_FILE,
            "settings:\n  include_content: true\nbundles:\n  - path: styles\n    kind: stylesheet\n",
        );
        write(root, "styles/site.css", "body { color: red; }");

        let manifest = build(root, &root.join(CONFIG_FILE), false).unwrap();
        assert_eq!(
            manifest.bundles[0].content.as_deref(),
            Some(&b"body { color: red; }"[..])
        );
    }

    #[test]
    fn test_build_missing_config() {
        let temp = TempDir::new().unwrap();
        let err = build(temp.path(), &temp.path().join(CONFIG_FILE), false).unwrap_err();
        assert!(matches!(err, SatchelError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_run_writes_manifest() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, CONFIG_FILE, "bundles:\n  - path: scripts\n    kind: script\n");
        write(root, "scripts/a.js", "var a;");

        let args = BuildArgs {
            config: None,
            output: None,
            include_content: false,
        };
        run(Some(root.to_path_buf()), args).unwrap();

        let manifest = BuildManifest::read(&root.join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.bundles.len(), 1);
    }
}
