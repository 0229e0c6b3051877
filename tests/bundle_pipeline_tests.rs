//! End-to-end tests: configuration to processed, ordered bundles

mod common;

use std::sync::Arc;

use common::TestWorkspace;
use satchel::asset::{Asset, AssetReferenceType};
use satchel::bundle::BundleFactory;
use satchel::config::{CONFIG_FILE, SatchelConfig};
use satchel::error::{Result, SatchelError};
use satchel::pipeline::PipelineSet;
use satchel::url::UrlGenerator;
use satchel::{BundleCollection, BundleKind};

fn load(workspace: &TestWorkspace) -> (SatchelConfig, BundleCollection) {
    let config = SatchelConfig::load(&workspace.path.join(CONFIG_FILE)).unwrap();
    let bundles = BundleFactory::new(&workspace.path)
        .create_all(&config.bundles)
        .unwrap();
    (config, BundleCollection::new(bundles))
}

fn processed(workspace: &TestWorkspace) -> (SatchelConfig, BundleCollection) {
    let (config, mut collection) = load(workspace);
    collection
        .process_all(&PipelineSet::new(&config.settings))
        .unwrap();
    (config, collection)
}

#[test]
fn test_reference_within_bundle_is_same_bundle() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (_, collection) = processed(&workspace);

    let main = collection.find_asset("~/scripts/app/main.js").unwrap();
    let references = main.references();
    assert_eq!(references[0].path, "~/scripts/app/helpers.js");
    assert_eq!(references[0].kind, AssetReferenceType::SameBundle);
    assert_eq!(references[0].source_line, 1);
    assert_eq!(references[1].path, "~/scripts/lib");
    assert_eq!(references[1].kind, AssetReferenceType::DifferentBundle);
}

#[test]
fn test_bundles_sorted_after_their_dependencies() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (_, mut collection) = processed(&workspace);

    collection.sort_by_dependencies().unwrap();
    let paths: Vec<_> = collection.bundles().iter().map(|b| b.path()).collect();
    assert_eq!(
        paths,
        vec!["~/scripts/lib", "~/scripts/app", "~/styles", "~/templates"]
    );
}

#[test]
fn test_bundles_for_template_include_script_chain() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (_, collection) = processed(&workspace);

    let needed: Vec<_> = collection
        .bundles_for("~/TEMPLATES")
        .unwrap()
        .iter()
        .map(|b| b.path().to_string())
        .collect();
    assert_eq!(needed, vec!["~/scripts/lib", "~/scripts/app", "~/templates"]);
}

#[test]
fn test_collection_aggregates_metadata() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (_, collection) = processed(&workspace);

    assert_eq!(collection.localized_strings(), vec!["App.Title", "Card.Title"]);
    assert_eq!(collection.ab_configs(), vec!["NewLib"]);
    assert!(collection.raw_file_exists("~/images/LOGO.png"));
    assert!(!collection.raw_file_exists("~/images/missing.png"));
}

#[test]
fn test_rendered_tags_use_route_prefix_and_attributes() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (config, collection) = processed(&workspace);
    let urls = UrlGenerator::new(&config.settings.route_prefix);

    let app = collection.get_bundle("~/scripts/app").unwrap();
    let html = app.render(&urls).unwrap();
    assert!(html.starts_with("<script src=\"assets/script/scripts/app_"));
    assert!(html.ends_with(" defer></script>"));

    let styles = collection.get_bundle("~/styles").unwrap();
    assert!(styles
        .render(&urls)
        .unwrap()
        .starts_with("<link href=\"assets/stylesheet/styles_"));
}

#[test]
fn test_template_content_is_registered() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (_, collection) = processed(&workspace);

    let templates = collection.get_bundle("~/templates").unwrap();
    assert_eq!(templates.kind(), BundleKind::HtmlTemplate);
    let content = String::from_utf8(templates.read_content().unwrap()).unwrap();
    assert!(content.contains("JST['card'] = \"\\u003c!-- @reference ~/scripts/app --"));
}

#[test]
fn test_bundle_hash_changes_with_content() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (_, before) = processed(&workspace);
    let before_hash = before.get_bundle("~/scripts/lib").unwrap().hash().unwrap().to_vec();
    let before_app = before.get_bundle("~/scripts/app").unwrap().hash().unwrap().to_vec();

    workspace.write_file("scripts/lib/lib.js", "function lib() { return 1; }\n");
    let (_, after) = processed(&workspace);
    assert_ne!(
        after.get_bundle("~/scripts/lib").unwrap().hash().unwrap(),
        before_hash.as_slice()
    );
    assert_eq!(
        after.get_bundle("~/scripts/app").unwrap().hash().unwrap(),
        before_app.as_slice()
    );
}

#[test]
fn test_circular_bundles_are_reported() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "bundles:\n  - path: a\n    kind: script\n  - path: b\n    kind: script\n",
    );
    workspace.write_file("a/a.js", "// @reference ~/b/b.js\n");
    workspace.write_file("b/b.js", "// @reference ~/a\n");
    let (_, mut collection) = processed(&workspace);

    let err = collection.sort_by_dependencies().unwrap_err();
    assert!(matches!(
        err,
        SatchelError::CircularReference { ref chain } if chain == "~/a -> ~/b -> ~/a"
    ));
}

#[test]
fn test_malformed_directive_fails_processing() {
    let workspace = TestWorkspace::new();
    workspace.write_config("bundles:\n  - path: s\n    kind: script\n");
    workspace.write_file("s/ok.js", "var ok;\n");
    workspace.write_file("s/bad.js", "\n\n// @reference \"unclosed.js\n");
    let (config, mut collection) = load(&workspace);

    let err = collection
        .process_all(&PipelineSet::new(&config.settings))
        .unwrap_err();
    assert!(matches!(
        err,
        SatchelError::MalformedDirective { ref path, line: 3, .. } if path == "~/s/bad.js"
    ));
}

#[test]
fn test_transformer_changes_content_not_hash() {
    let workspace = TestWorkspace::new();
    workspace.with_sample_site();
    let (config, mut plain) = load(&workspace);
    plain.process_all(&PipelineSet::new(&config.settings)).unwrap();

    let (_, mut shouting) = load(&workspace);
    let mut pipelines = PipelineSet::new(&config.settings);
    pipelines
        .get_mut(BundleKind::Script)
        .add_transformer(Arc::new(|content: Vec<u8>, _: &str| -> Result<Vec<u8>> {
            Ok(content.to_ascii_uppercase())
        }));
    shouting.process_all(&pipelines).unwrap();

    let plain_lib = plain.get_bundle("~/scripts/lib").unwrap();
    let shouting_lib = shouting.get_bundle("~/scripts/lib").unwrap();
    assert_eq!(plain_lib.hash().unwrap(), shouting_lib.hash().unwrap());
    assert!(
        String::from_utf8(shouting_lib.read_content().unwrap())
            .unwrap()
            .contains("FUNCTION LIB()")
    );
}
