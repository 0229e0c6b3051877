//! Cache-busting URLs for bundles, assets and raw files
//!
//! Every URL embeds a content hash, so a changed file always gets a new URL
//! and unchanged files can be cached forever.

use crate::asset::{Asset, path};
use crate::bundle::Bundle;
use crate::error::{Result, SatchelError};
use crate::hash;

pub const DEFAULT_ROUTE_PREFIX: &str = "_satchel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlGenerator {
    route_prefix: String,
}

impl Default for UrlGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_PREFIX)
    }
}

impl UrlGenerator {
    pub fn new(route_prefix: &str) -> Self {
        Self {
            route_prefix: route_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    /// `<prefix>/<kind>/<path>_<hash>`
    ///
    /// # Errors
    ///
    /// Fails when the bundle has no hash yet.
    pub fn bundle_url(&self, bundle: &Bundle) -> Result<String> {
        Ok(format!(
            "{}/{}/{}_{}",
            self.route_prefix,
            bundle.kind().url_segment(),
            strip_app_root(bundle.path()),
            hash::to_hex(bundle.hash()?)
        ))
    }

    /// `<prefix>/asset/<path>?<hash>`
    pub fn asset_url(&self, asset: &dyn Asset) -> Result<String> {
        Ok(format!(
            "{}/asset/{}?{}",
            self.route_prefix,
            strip_app_root(asset.path()),
            hash::to_hex(asset.hash()?)
        ))
    }

    /// `<prefix>/file/<name>_<hash>.<extension>`
    ///
    /// # Errors
    ///
    /// `filename` must be application relative (start with `~`).
    pub fn raw_file_url(&self, filename: &str, hash_hex: &str) -> Result<String> {
        if !filename.starts_with('~') {
            return Err(SatchelError::InvalidRawFilePath {
                path: filename.to_string(),
            });
        }

        let forward = path::to_forward_slashes(filename);
        let filename = strip_app_root(&forward);
        let url = match filename.rsplit_once('.') {
            Some((name, extension)) if !name.is_empty() && !extension.contains('/') => format!(
                "{}/file/{}_{}.{}",
                self.route_prefix, name, hash_hex, extension
            ),
            _ => format!("{}/file/{}_{}", self.route_prefix, filename, hash_hex),
        };
        Ok(url)
    }
}

fn strip_app_root(path: &str) -> &str {
    path.strip_prefix("~/")
        .or_else(|| path.strip_prefix('~'))
        .unwrap_or(path)
}
