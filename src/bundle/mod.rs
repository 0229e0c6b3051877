//! Bundles: ordered collections of assets served as one artifact
//!
//! Asset order is the order assets were added. A bundle's hash is assigned by
//! the processing pipeline and covers every asset hash, the asset order and
//! the bundle configuration that affects rendering.

pub mod descriptor;
pub mod factory;
pub mod render;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetReferenceType, BundleScope, path};
use crate::error::{Result, bundle as bundle_error};
use crate::hash::FieldHasher;
use crate::scanner::CommentScanner;
use crate::url::UrlGenerator;

pub use descriptor::BundleDescriptor;
pub use factory::BundleFactory;

/// The closed set of bundle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleKind {
    Script,
    Stylesheet,
    HtmlTemplate,
}

impl BundleKind {
    pub fn content_type(self) -> &'static str {
        match self {
            BundleKind::Script | BundleKind::HtmlTemplate => "text/javascript",
            BundleKind::Stylesheet => "text/css",
        }
    }

    /// Scanner for the directives in this kind's source files
    pub fn scanner(self) -> CommentScanner {
        match self {
            BundleKind::Script => CommentScanner::Script,
            BundleKind::Stylesheet => CommentScanner::Stylesheet,
            BundleKind::HtmlTemplate => CommentScanner::Markup,
        }
    }

    /// File extensions whose content is scanned for directives
    pub fn source_extensions(self) -> &'static [&'static str] {
        match self {
            BundleKind::Script => &["js"],
            BundleKind::Stylesheet => &["css"],
            BundleKind::HtmlTemplate => &["htm", "html", "mustache", "hbs", "handlebars"],
        }
    }

    /// Patterns used when a bundle lists no files
    pub fn default_patterns(self) -> &'static [&'static str] {
        match self {
            BundleKind::Script => &["**/*.js"],
            BundleKind::Stylesheet => &["**/*.css"],
            BundleKind::HtmlTemplate => &["**/*.htm", "**/*.html"],
        }
    }

    /// Route segment in bundle URLs
    pub fn url_segment(self) -> &'static str {
        match self {
            BundleKind::Script => "script",
            BundleKind::Stylesheet => "stylesheet",
            BundleKind::HtmlTemplate => "htmltemplate",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BundleKind::Script => "script",
            BundleKind::Stylesheet => "stylesheet",
            BundleKind::HtmlTemplate => "html_template",
        }
    }

    /// True when `asset_path` carries directives for this kind
    pub fn is_source(self, asset_path: &str) -> bool {
        std::path::Path::new(asset_path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|extension| {
                self.source_extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(extension))
            })
    }
}

impl std::fmt::Display for BundleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An externally hosted copy of a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSource {
    pub url: String,
    /// JavaScript condition that, when true, loads the local bundle instead
    pub fallback_condition: Option<String>,
}

#[derive(Debug)]
pub struct Bundle {
    path: String,
    kind: BundleKind,
    assets: Vec<Box<dyn Asset>>,
    references: Vec<String>,
    localized_strings: Vec<String>,
    ab_configs: Vec<String>,
    page_location: Option<String>,
    html_attributes: BTreeMap<String, String>,
    external: Option<ExternalSource>,
    hash: Option<Vec<u8>>,
    inline_content: Option<Vec<u8>>,
    rendered_html: Option<String>,
}

impl Bundle {
    /// `path` is made application relative
    pub fn new(path: &str, kind: BundleKind) -> Self {
        Self {
            path: path::app_relative(path),
            kind,
            assets: Vec::new(),
            references: Vec::new(),
            localized_strings: Vec::new(),
            ab_configs: Vec::new(),
            page_location: None,
            html_attributes: BTreeMap::new(),
            external: None,
            hash: None,
            inline_content: None,
            rendered_html: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    pub fn assets(&self) -> &[Box<dyn Asset>] {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut [Box<dyn Asset>] {
        &mut self.assets
    }

    pub fn add_asset(&mut self, asset: Box<dyn Asset>) {
        self.assets.push(asset);
    }

    /// Declare a dependency on another bundle or asset.
    ///
    /// Relative paths resolve against the bundle's own path; URLs are kept.
    pub fn add_reference(&mut self, target: &str) {
        let reference = if path::is_url(target) {
            target.to_string()
        } else {
            path::resolve(&self.path, target)
        };
        if !self.references.iter().any(|r| path::same_path(r, &reference)) {
            self.references.push(reference);
        }
    }

    /// Declared bundle-level references
    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn add_localized_string(&mut self, name: &str) {
        self.localized_strings.push(name.to_string());
    }

    pub fn add_ab_config(&mut self, name: &str) {
        self.ab_configs.push(name.to_string());
    }

    /// Declared localization keys followed by those found in assets, without duplicates
    pub fn localized_strings(&self) -> Vec<String> {
        let found = self
            .assets
            .iter()
            .flat_map(|a| a.localized_strings().iter().map(|l| l.name.as_str()));
        distinct(self.localized_strings.iter().map(String::as_str).chain(found))
    }

    /// Declared A/B flags followed by those found in assets, without duplicates
    pub fn ab_configs(&self) -> Vec<String> {
        let found = self
            .assets
            .iter()
            .flat_map(|a| a.ab_configs().iter().map(|c| c.name.as_str()));
        distinct(self.ab_configs.iter().map(String::as_str).chain(found))
    }

    /// Paths this bundle depends on: declared references, then every
    /// `DifferentBundle` reference of its assets. Case-insensitively unique.
    pub fn dependency_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let declared = self
            .references
            .iter()
            .filter(|r| !path::is_url(r))
            .map(String::as_str);
        let found = self
            .assets
            .iter()
            .flat_map(|a| a.references())
            .filter(|r| r.kind == AssetReferenceType::DifferentBundle)
            .map(|r| r.path.as_str());

        declared
            .chain(found)
            .filter(|p| seen.insert(p.to_lowercase()))
            .map(str::to_string)
            .collect()
    }

    pub fn page_location(&self) -> Option<&str> {
        self.page_location.as_deref()
    }

    pub fn set_page_location(&mut self, location: Option<String>) {
        self.page_location = location;
    }

    pub fn html_attributes(&self) -> &BTreeMap<String, String> {
        &self.html_attributes
    }

    pub fn set_html_attribute(&mut self, name: &str, value: &str) {
        self.html_attributes.insert(name.to_string(), value.to_string());
    }

    pub fn external(&self) -> Option<&ExternalSource> {
        self.external.as_ref()
    }

    pub fn set_external(&mut self, external: Option<ExternalSource>) {
        self.external = external;
    }

    /// Case-insensitive: true for the bundle's own path and its assets' paths
    pub fn contains_path(&self, path: &str) -> bool {
        path::same_path(&self.path, path) || self.find_asset(path).is_some()
    }

    pub fn find_asset(&self, path: &str) -> Option<&dyn Asset> {
        self.assets
            .iter()
            .find(|a| path::same_path(a.path(), path))
            .map(|a| a.as_ref())
    }

    /// Snapshot of the bundle's membership for reference classification
    pub fn scope(&self) -> BundleScope {
        BundleScope::new(&self.path, self.assets.iter().map(|a| a.path()))
    }

    pub fn is_processed(&self) -> bool {
        self.hash.is_some()
    }

    /// # Errors
    ///
    /// Fails until the pipeline has assigned a hash.
    pub fn hash(&self) -> Result<&[u8]> {
        self.hash
            .as_deref()
            .ok_or_else(|| bundle_error::not_processed(&self.path))
    }

    pub(crate) fn set_hash(&mut self, hash: Vec<u8>) {
        self.hash = Some(hash);
    }

    /// Hash over the bundle path and kind, each asset's path and hash in
    /// order, declared references, page location, external source and HTML
    /// attributes
    pub fn compute_hash(&self) -> Result<Vec<u8>> {
        let mut hasher = FieldHasher::new();
        hasher.field(&self.path).field(self.kind.as_str());

        hasher.field(self.assets.len().to_le_bytes());
        for asset in &self.assets {
            hasher.field(asset.path()).field(asset.hash()?);
        }

        hasher.field(self.references.len().to_le_bytes());
        for reference in &self.references {
            hasher.field(reference);
        }

        match &self.page_location {
            Some(location) => hasher.field([1u8]).field(location),
            None => hasher.field([0u8]),
        };
        match &self.external {
            Some(external) => hasher
                .field([1u8])
                .field(&external.url)
                .field(external.fallback_condition.as_deref().unwrap_or_default()),
            None => hasher.field([0u8]),
        };
        hasher.field(self.html_attributes.len().to_le_bytes());
        for (name, value) in &self.html_attributes {
            hasher.field(name).field(value);
        }

        Ok(hasher.finish())
    }

    /// Concatenated transformed content of every asset, newline separated.
    ///
    /// Bundles rebuilt from a manifest serve the content stored with them.
    pub fn read_content(&self) -> Result<Vec<u8>> {
        if let Some(content) = &self.inline_content {
            return Ok(content.clone());
        }

        let mut content = Vec::new();
        for (i, asset) in self.assets.iter().enumerate() {
            if i > 0 {
                content.push(b'\n');
            }
            content.extend(asset.read_content()?);
        }
        Ok(content)
    }

    pub(crate) fn set_inline_content(&mut self, content: Option<Vec<u8>>) {
        self.inline_content = content;
    }

    pub(crate) fn set_rendered_html(&mut self, html: String) {
        self.rendered_html = Some(html);
    }

    /// HTML tag that loads this bundle
    pub fn render(&self, urls: &UrlGenerator) -> Result<String> {
        match &self.rendered_html {
            Some(html) => Ok(html.clone()),
            None => render::render(self, urls),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{FileAsset, MemoryFile};
    use std::sync::Arc;

    fn asset(path: &str, content: &str) -> Box<dyn Asset> {
        Box::new(FileAsset::new(Arc::new(MemoryFile::new(path, content))))
    }

    fn bundle_with(path: &str, files: &[(&str, &str)]) -> Bundle {
        let mut bundle = Bundle::new(path, BundleKind::Script);
        for (file, content) in files {
            bundle.add_asset(asset(file, content));
        }
        bundle
    }

    #[test]
    fn test_new_normalizes_path() {
        assert_eq!(Bundle::new("scripts/app/", BundleKind::Script).path(), "~/scripts/app");
    }

    #[test]
    fn test_kind_metadata() {
        assert_eq!(BundleKind::Stylesheet.content_type(), "text/css");
        assert_eq!(BundleKind::HtmlTemplate.scanner(), CommentScanner::Markup);
        assert!(BundleKind::Script.is_source("~/a/b.JS"));
        assert!(!BundleKind::Stylesheet.is_source("~/img/logo.png"));
    }

    #[test]
    fn test_read_content_concatenates_in_order() {
        let bundle = bundle_with("~/scripts", &[("~/scripts/b.js", "b"), ("~/scripts/a.js", "a")]);
        assert_eq!(bundle.read_content().unwrap(), b"b\na");
    }

    #[test]
    fn test_contains_path_case_insensitive() {
        let bundle = bundle_with("~/scripts", &[("~/scripts/A.js", "")]);
        assert!(bundle.contains_path("~/scripts/a.js"));
        assert!(bundle.contains_path("~/SCRIPTS"));
        assert!(!bundle.contains_path("~/scripts/b.js"));
    }

    #[test]
    fn test_hash_changes_with_content_order_and_config() {
        let ab = bundle_with("~/s", &[("~/s/a.js", "a"), ("~/s/b.js", "b")]);
        let ba = bundle_with("~/s", &[("~/s/b.js", "b"), ("~/s/a.js", "a")]);
        let ab_changed = bundle_with("~/s", &[("~/s/a.js", "a2"), ("~/s/b.js", "b")]);
        let mut ab_attr = bundle_with("~/s", &[("~/s/a.js", "a"), ("~/s/b.js", "b")]);
        ab_attr.set_html_attribute("async", "");

        let base = ab.compute_hash().unwrap();
        assert_eq!(
            base,
            bundle_with("~/s", &[("~/s/a.js", "a"), ("~/s/b.js", "b")])
                .compute_hash()
                .unwrap()
        );
        assert_ne!(base, ba.compute_hash().unwrap());
        assert_ne!(base, ab_changed.compute_hash().unwrap());
        assert_ne!(base, ab_attr.compute_hash().unwrap());
    }

    #[test]
    fn test_hash_tells_external_source_from_html_attribute() {
        let mut external = bundle_with("~/s", &[("~/s/a.js", "a")]);
        external.set_external(Some(ExternalSource {
            url: "cdn".to_string(),
            fallback_condition: None,
        }));
        let mut attribute = bundle_with("~/s", &[("~/s/a.js", "a")]);
        attribute.set_html_attribute("cdn", "");
        assert_ne!(external.compute_hash().unwrap(), attribute.compute_hash().unwrap());

        let mut empty_location = bundle_with("~/s", &[("~/s/a.js", "a")]);
        empty_location.set_page_location(Some(String::new()));
        assert_ne!(
            empty_location.compute_hash().unwrap(),
            bundle_with("~/s", &[("~/s/a.js", "a")]).compute_hash().unwrap()
        );
    }

    #[test]
    fn test_hash_unavailable_before_processing() {
        let mut bundle = Bundle::new("~/s", BundleKind::Script);
        assert!(!bundle.is_processed());
        assert!(bundle.hash().is_err());
        bundle.set_hash(vec![1]);
        assert_eq!(bundle.hash().unwrap(), &[1]);
    }

    #[test]
    fn test_declared_references_resolve_against_bundle_path() {
        let mut bundle = Bundle::new("~/scripts/app", BundleKind::Script);
        bundle.add_reference("../lib");
        bundle.add_reference("~/shared");
        bundle.add_reference("~/Shared");
        bundle.add_reference("https://cdn.example.com/x.js");
        assert_eq!(
            bundle.references(),
            &["~/scripts/lib", "~/shared", "https://cdn.example.com/x.js"]
        );
        assert_eq!(bundle.dependency_paths(), vec!["~/scripts/lib", "~/shared"]);
    }

    #[test]
    fn test_dependency_paths_include_different_bundle_references() {
        let mut bundle = bundle_with("~/app", &[("~/app/a.js", ""), ("~/app/b.js", "")]);
        let scope = bundle.scope();
        let assets = bundle.assets_mut();
        assets[0].add_reference("b.js", 1, &scope).unwrap();
        assets[0].add_reference("~/lib/jquery.js", 2, &scope).unwrap();
        assets[1].add_reference("~/LIB/jquery.js", 1, &scope).unwrap();
        assets[1].add_reference("//cdn.example.com/x.js", 3, &scope).unwrap();
        assert_eq!(bundle.dependency_paths(), vec!["~/lib/jquery.js"]);
    }

    #[test]
    fn test_localized_strings_aggregate_without_duplicates() {
        let mut bundle = bundle_with("~/app", &[("~/app/a.js", ""), ("~/app/b.js", "")]);
        bundle.add_localized_string("Declared.Key");
        bundle.assets_mut()[0].add_localized_string("A.Key", 1).unwrap();
        bundle.assets_mut()[1].add_localized_string("A.Key", 4).unwrap();
        bundle.assets_mut()[1].add_ab_config("Flag", 2).unwrap();
        assert_eq!(bundle.localized_strings(), vec!["Declared.Key", "A.Key"]);
        assert_eq!(bundle.ab_configs(), vec!["Flag"]);
    }
}
