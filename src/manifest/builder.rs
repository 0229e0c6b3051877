//! Flatten assets and bundles into manifests

use crate::asset::{Asset, AssetReferenceType};
use crate::bundle::Bundle;
use crate::error::Result;
use crate::url::UrlGenerator;

use super::{
    AssetAbConfigManifest, AssetLocalizedStringManifest, AssetManifest, AssetReferenceManifest,
    BundleManifest,
};

/// Snapshot of an asset's path and everything it references outside its bundle
pub fn build_asset_manifest(asset: &dyn Asset) -> AssetManifest {
    AssetManifest {
        path: asset.path().to_string(),
        references: asset
            .references()
            .iter()
            .filter(|r| r.kind != AssetReferenceType::SameBundle)
            .map(|r| AssetReferenceManifest {
                path: r.path.clone(),
                kind: r.kind,
                source_line: r.source_line,
            })
            .collect(),
        localized_strings: asset
            .localized_strings()
            .iter()
            .map(|l| AssetLocalizedStringManifest {
                localized_string: l.name.clone(),
                source_line: l.source_line,
            })
            .collect(),
        ab_configs: asset
            .ab_configs()
            .iter()
            .map(|a| AssetAbConfigManifest {
                ab_config: a.name.clone(),
                source_line: a.source_line,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct BundleManifestBuilder {
    urls: UrlGenerator,
    include_content: bool,
}

impl BundleManifestBuilder {
    pub fn new(urls: UrlGenerator) -> Self {
        Self {
            urls,
            include_content: false,
        }
    }

    /// Store each bundle's concatenated content in its manifest
    pub fn include_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }

    /// # Errors
    ///
    /// Fails for bundles that have not been processed, and when content is
    /// requested but cannot be read.
    pub fn build(&self, bundle: &Bundle) -> Result<BundleManifest> {
        let content = if self.include_content && !bundle.assets().is_empty() {
            Some(bundle.read_content()?)
        } else {
            None
        };

        Ok(BundleManifest {
            path: bundle.path().to_string(),
            kind: bundle.kind(),
            hash: bundle.hash()?.to_vec(),
            content_type: bundle.content_type().to_string(),
            page_location: bundle.page_location().map(str::to_string),
            content,
            html: bundle.render(&self.urls)?,
            external_url: bundle.external().map(|e| e.url.clone()),
            fallback_condition: bundle
                .external()
                .and_then(|e| e.fallback_condition.clone()),
            references: bundle.references().to_vec(),
            localized_strings: bundle.localized_strings(),
            ab_configs: bundle.ab_configs(),
            html_attributes: bundle.html_attributes().clone(),
            assets: bundle
                .assets()
                .iter()
                .map(|a| build_asset_manifest(a.as_ref()))
                .collect(),
        })
    }

    pub fn build_all<'a>(
        &self,
        bundles: impl IntoIterator<Item = &'a Bundle>,
    ) -> Result<Vec<BundleManifest>> {
        bundles.into_iter().map(|b| self.build(b)).collect()
    }
}
