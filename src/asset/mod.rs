//! Assets and the references between them
//!
//! An [`Asset`] is one source file inside a bundle. Its identity (path) is fixed
//! at creation; its reference collections are filled once by the processing
//! pipeline and read afterwards. The content hash covers the original,
//! untransformed bytes and is computed on first use.

pub mod path;
pub mod source;
pub mod transform;

use std::collections::HashSet;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{Result, fs};
use crate::hash;

pub use source::{DiskFile, MemoryFile, SourceFile};
pub use transform::{AssetTransformer, RegisterTemplate};

/// Classification of a reference edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetReferenceType {
    /// Target is an asset in the same bundle
    SameBundle,
    /// Target is an asset or bundle outside the referencing bundle
    DifferentBundle,
    /// Target is a non-code file such as an image
    RawFilename,
    /// Target is an absolute URL
    Url,
}

/// A directed edge from an asset to a path or URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Normalized application-relative path, or the URL as written
    pub path: String,
    /// Path of the asset declaring the reference
    pub source_asset: String,
    /// 1-based line of the declaration; 0 when unknown
    pub source_line: usize,
    pub kind: AssetReferenceType,
}

/// A localization key used by an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocalizedString {
    pub name: String,
    pub source_asset: String,
    pub source_line: usize,
}

/// An A/B configuration flag checked by an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAbConfig {
    pub name: String,
    pub source_asset: String,
    pub source_line: usize,
}

/// The bundle an asset belongs to while its references are resolved.
///
/// Path comparisons are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct BundleScope {
    bundle_path: String,
    asset_paths: HashSet<String>,
}

impl BundleScope {
    pub fn new<'a>(bundle_path: &str, asset_paths: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            bundle_path: bundle_path.to_lowercase(),
            asset_paths: asset_paths.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// True when `path` names the bundle itself or one of its assets
    pub fn contains(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        path == self.bundle_path || self.asset_paths.contains(&path)
    }
}

/// A source file inside a bundle
pub trait Asset: Send + Sync + fmt::Debug {
    /// Application-relative path (`~/...`)
    fn path(&self) -> &str;

    /// Content hash of the original bytes, computed once
    fn hash(&self) -> Result<&[u8]>;

    fn references(&self) -> &[AssetReference];

    fn localized_strings(&self) -> &[AssetLocalizedString];

    fn ab_configs(&self) -> &[AssetAbConfig];

    /// Drop every transformer and recorded reference, localization key and
    /// A/B flag, leaving the asset as it was created
    fn reset(&mut self) -> Result<()>;

    /// Append a transformer to the chain applied by [`Asset::open_stream`]
    fn add_transformer(&mut self, transformer: Arc<dyn AssetTransformer>) -> Result<()>;

    /// Record a reference written in this asset.
    ///
    /// URLs are kept as written. Other targets are resolved against the
    /// asset's directory and classified against `scope`.
    fn add_reference(&mut self, target: &str, line: usize, scope: &BundleScope) -> Result<()>;

    /// Record a raw file reference. Adding the same path twice is a no-op.
    fn add_raw_file_reference(&mut self, target: &str, line: usize) -> Result<()>;

    fn add_localized_string(&mut self, name: &str, line: usize) -> Result<()>;

    fn add_ab_config(&mut self, name: &str, line: usize) -> Result<()>;

    /// Open the content with every transformer applied in registration order
    fn open_stream(&self) -> Result<Box<dyn Read + Send + '_>>;

    /// Open the untransformed content
    fn open_original(&self) -> Result<Box<dyn Read + Send + '_>>;

    /// Read the transformed content fully
    fn read_content(&self) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        self.open_stream()?
            .read_to_end(&mut content)
            .map_err(|e| fs::read_failed(self.path(), e.to_string()))?;
        Ok(content)
    }
}

/// An asset backed by a [`SourceFile`]
pub struct FileAsset {
    source: Arc<dyn SourceFile>,
    transformers: Vec<Arc<dyn AssetTransformer>>,
    hash: OnceCell<Vec<u8>>,
    references: Vec<AssetReference>,
    localized_strings: Vec<AssetLocalizedString>,
    ab_configs: Vec<AssetAbConfig>,
}

impl FileAsset {
    pub fn new(source: Arc<dyn SourceFile>) -> Self {
        Self {
            source,
            transformers: Vec::new(),
            hash: OnceCell::new(),
            references: Vec::new(),
            localized_strings: Vec::new(),
            ab_configs: Vec::new(),
        }
    }

    pub fn source_file(&self) -> &dyn SourceFile {
        self.source.as_ref()
    }

    fn reference(&self, path: String, line: usize, kind: AssetReferenceType) -> AssetReference {
        AssetReference {
            path,
            source_asset: self.path().to_string(),
            source_line: line,
            kind,
        }
    }
}

impl fmt::Debug for FileAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAsset")
            .field("path", &self.path())
            .field("transformers", &self.transformers.len())
            .field("references", &self.references)
            .field("localized_strings", &self.localized_strings)
            .field("ab_configs", &self.ab_configs)
            .finish()
    }
}

impl Asset for FileAsset {
    fn path(&self) -> &str {
        self.source.full_path()
    }

    fn hash(&self) -> Result<&[u8]> {
        self.hash
            .get_or_try_init(|| hash::hash_reader(self.source.open_read()?, self.path()))
            .map(Vec::as_slice)
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
        self.transformers.clear();
        self.references.clear();
        self.localized_strings.clear();
        self.ab_configs.clear();
        Ok(())
    }

    fn add_transformer(&mut self, transformer: Arc<dyn AssetTransformer>) -> Result<()> {
        self.transformers.push(transformer);
        Ok(())
    }

    fn add_reference(&mut self, target: &str, line: usize, scope: &BundleScope) -> Result<()> {
        let reference = if path::is_url(target) {
            self.reference(target.to_string(), line, AssetReferenceType::Url)
        } else {
            let resolved = path::resolve(self.source.directory(), target);
            let kind = if scope.contains(&resolved) {
                AssetReferenceType::SameBundle
            } else {
                AssetReferenceType::DifferentBundle
            };
            self.reference(resolved, line, kind)
        };
        self.references.push(reference);
        Ok(())
    }

    fn add_raw_file_reference(&mut self, target: &str, line: usize) -> Result<()> {
        let resolved = path::resolve(self.source.directory(), target);
        let already_exists = self
            .references
            .iter()
            .any(|r| path::same_path(&r.path, &resolved));
        if !already_exists {
            let reference = self.reference(resolved, line, AssetReferenceType::RawFilename);
            self.references.push(reference);
        }
        Ok(())
    }

    fn add_localized_string(&mut self, name: &str, line: usize) -> Result<()> {
        self.localized_strings.push(AssetLocalizedString {
            name: name.to_string(),
            source_asset: self.path().to_string(),
            source_line: line,
        });
        Ok(())
    }

    fn add_ab_config(&mut self, name: &str, line: usize) -> Result<()> {
        self.ab_configs.push(AssetAbConfig {
            name: name.to_string(),
            source_asset: self.path().to_string(),
            source_line: line,
        });
        Ok(())
    }

    fn open_stream(&self) -> Result<Box<dyn Read + Send + '_>> {
        if self.transformers.is_empty() {
            return self.source.open_read();
        }

        let mut content = Vec::new();
        self.source
            .open_read()?
            .read_to_end(&mut content)
            .map_err(|e| fs::read_failed(self.path(), e.to_string()))?;

        for transformer in &self.transformers {
            tracing::trace!(
                asset = self.path(),
                transformer = transformer.name(),
                "applying transformer"
            );
            content = transformer.transform(content, self.path())?;
        }
        Ok(Box::new(Cursor::new(content)))
    }

    fn open_original(&self) -> Result<Box<dyn Read + Send + '_>> {
        self.source.open_read()
    }
}
