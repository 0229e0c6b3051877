//! Build bundles from definitions by matching files on disk
//!
//! Each pattern is matched against the files below the bundle directory in
//! turn. Files are added in pattern order, sorted by path within a pattern,
//! and each file is added at most once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use super::descriptor::is_explicit_file;
use super::{Bundle, BundleKind};
use crate::asset::{DiskFile, FileAsset, SourceFile, path};
use crate::config::BundleDefinition;
use crate::error::{Result, bundle as bundle_error, fs};

/// Creates bundles for files below an application root
#[derive(Debug, Clone)]
pub struct BundleFactory {
    root: PathBuf,
}

impl BundleFactory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Disk location of an application-relative path
    pub fn disk_path(&self, app_path: &str) -> Result<PathBuf> {
        Ok(DiskFile::new(&self.root, app_path)?.disk_path().to_path_buf())
    }

    /// Build the bundle a definition describes.
    ///
    /// # Errors
    ///
    /// Fails when the bundle directory is missing (unless the bundle is served
    /// from an external URL), when an explicitly listed file is missing, or when
    /// a pattern is not a valid glob.
    pub fn create(&self, definition: &BundleDefinition) -> Result<Bundle> {
        let mut bundle = Bundle::new(&definition.path, definition.kind);
        definition.descriptor.apply_to(&mut bundle);
        bundle.set_page_location(definition.page_location.clone());
        for (name, value) in &definition.html_attributes {
            bundle.set_html_attribute(name, value);
        }

        let files = self.match_files(definition)?;
        tracing::debug!(bundle = bundle.path(), files = files.len(), "matched bundle files");
        for file in files {
            bundle.add_asset(Box::new(FileAsset::new(Arc::new(file))));
        }

        Ok(bundle)
    }

    fn match_files(&self, definition: &BundleDefinition) -> Result<Vec<DiskFile>> {
        let bundle_path = definition.path.as_str();
        let bundle_dir = self.disk_path(bundle_path)?;

        if bundle_dir.is_file() {
            return Ok(vec![DiskFile::new(&self.root, bundle_path)?]);
        }

        let patterns = definition.descriptor.patterns(definition.kind);
        let has_globs = patterns.iter().any(|p| !is_explicit_file(p));
        let candidates = if bundle_dir.is_dir() {
            list_files(&bundle_dir)
        } else if has_globs && definition.descriptor.external_url.is_none() {
            return Err(fs::not_found(bundle_dir.display().to_string()));
        } else {
            Vec::new()
        };

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for pattern in patterns {
            if is_explicit_file(pattern) {
                let file = DiskFile::new(&self.root, pattern)?;
                if !file.exists() {
                    return Err(fs::not_found(file.disk_path().display().to_string()));
                }
                if seen.insert(file.full_path().to_lowercase()) {
                    files.push(file);
                }
                continue;
            }

            let glob = Glob::new(pattern)
                .map_err(|e| bundle_error::invalid_glob(pattern, e.to_string()))?;
            let before = files.len();
            for relative in &candidates {
                if glob.matched(&CandidatePath::from(relative.as_str())).is_none() {
                    continue;
                }
                let app_path = path::combine(bundle_path, relative);
                if seen.insert(app_path.to_lowercase()) {
                    files.push(DiskFile::new(&self.root, &app_path)?);
                }
            }
            if files.len() == before {
                tracing::warn!(bundle = bundle_path, pattern, "pattern matched no files");
            }
        }

        Ok(files)
    }

    /// Build every bundle in `definitions`, in order
    pub fn create_all(&self, definitions: &[BundleDefinition]) -> Result<Vec<Bundle>> {
        definitions.iter().map(|d| self.create(d)).collect()
    }

    /// Single-file bundle for ad hoc use
    pub fn create_for_file(&self, app_path: &str, kind: BundleKind) -> Result<Bundle> {
        let file = DiskFile::new(&self.root, app_path)?;
        if !file.exists() {
            return Err(fs::not_found(file.disk_path().display().to_string()));
        }
        let mut bundle = Bundle::new(file.full_path(), kind);
        bundle.add_asset(Box::new(FileAsset::new(Arc::new(file))));
        Ok(bundle)
    }
}

/// Files below `dir` as sorted forward-slash paths relative to `dir`
fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(dir)
                .ok()
                .map(|relative| path::to_forward_slashes(&relative.to_string_lossy()))
        })
        .collect();
    files.sort();
    files
}
