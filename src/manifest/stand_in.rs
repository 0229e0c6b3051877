//! Read-only assets and bundles rebuilt from manifests
//!
//! Stand-ins expose the metadata a manifest carries. Anything that needs the
//! original source (hashing, reading, adding references or transformers)
//! fails with `UnsupportedOperation`.

use std::io::Read;
use std::sync::Arc;

use crate::asset::{
    Asset, AssetAbConfig, AssetLocalizedString, AssetReference, AssetTransformer, BundleScope,
};
use crate::bundle::{Bundle, ExternalSource};
use crate::error::{Result, manifest as manifest_error};

use super::{AssetManifest, BundleManifest};

#[derive(Debug, Clone)]
pub struct ManifestAsset {
    path: String,
    references: Vec<AssetReference>,
    localized_strings: Vec<AssetLocalizedString>,
    ab_configs: Vec<AssetAbConfig>,
}

impl ManifestAsset {
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let path = manifest.path.clone();
        Self {
            references: manifest
                .references
                .iter()
                .map(|r| AssetReference {
                    path: r.path.clone(),
                    source_asset: path.clone(),
                    source_line: r.source_line,
                    kind: r.kind,
                })
                .collect(),
            localized_strings: manifest
                .localized_strings
                .iter()
                .map(|l| AssetLocalizedString {
                    name: l.localized_string.clone(),
                    source_asset: path.clone(),
                    source_line: l.source_line,
                })
                .collect(),
            ab_configs: manifest
                .ab_configs
                .iter()
                .map(|a| AssetAbConfig {
                    name: a.ab_config.clone(),
                    source_asset: path.clone(),
                    source_line: a.source_line,
                })
                .collect(),
            path,
        }
    }

    fn unsupported<T>(&self, operation: &str) -> Result<T> {
        Err(manifest_error::unsupported(operation, &self.path))
    }
}

impl Asset for ManifestAsset {
    fn path(&self) -> &str {
        &self.path
    }

    fn hash(&self) -> Result<&[u8]> {
        self.unsupported("hash")
    }

    fn references(&self) -> &[AssetReference] {
        &self.references
    }

    fn localized_strings(&self) -> &[AssetLocalizedString] {
        &self.localized_strings
    }

    fn ab_configs(&self) -> &[AssetAbConfig] {
        &self.ab_configs
    }

    fn reset(&mut self) -> Result<()> {
        self.unsupported("reset")
    }

    fn add_transformer(&mut self, _transformer: Arc<dyn AssetTransformer>) -> Result<()> {
        self.unsupported("add_transformer")
    }

    fn add_reference(&mut self, _target: &str, _line: usize, _scope: &BundleScope) -> Result<()> {
        self.unsupported("add_reference")
    }

    fn add_raw_file_reference(&mut self, _target: &str, _line: usize) -> Result<()> {
        self.unsupported("add_raw_file_reference")
    }

    fn add_localized_string(&mut self, _name: &str, _line: usize) -> Result<()> {
        self.unsupported("add_localized_string")
    }

    fn add_ab_config(&mut self, _name: &str, _line: usize) -> Result<()> {
        self.unsupported("add_ab_config")
    }

    fn open_stream(&self) -> Result<Box<dyn Read + Send + '_>> {
        self.unsupported("open_stream")
    }

    fn open_original(&self) -> Result<Box<dyn Read + Send + '_>> {
        self.unsupported("open_original")
    }
}

impl Bundle {
    /// Rebuild a processed, read-only bundle.
    ///
    /// The result renders the stored HTML, reports the stored hash and serves
    /// content only if the manifest carries it.
    pub fn from_manifest(manifest: &BundleManifest) -> Self {
        let mut bundle = Bundle::new(&manifest.path, manifest.kind);
        for asset in &manifest.assets {
            bundle.add_asset(Box::new(ManifestAsset::from_manifest(asset)));
        }
        for reference in &manifest.references {
            bundle.add_reference(reference);
        }
        for name in &manifest.localized_strings {
            bundle.add_localized_string(name);
        }
        for name in &manifest.ab_configs {
            bundle.add_ab_config(name);
        }
        for (name, value) in &manifest.html_attributes {
            bundle.set_html_attribute(name, value);
        }
        bundle.set_page_location(manifest.page_location.clone());
        bundle.set_external(manifest.external_url.as_ref().map(|url| ExternalSource {
            url: url.clone(),
            fallback_condition: manifest.fallback_condition.clone(),
        }));
        bundle.set_hash(manifest.hash.clone());
        bundle.set_inline_content(manifest.content.clone());
        bundle.set_rendered_html(manifest.html.clone());
        bundle
    }
}
