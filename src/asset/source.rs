//! File provider boundary
//!
//! A [`SourceFile`] supplies a readable byte stream, a stable application
//! relative path and a last-write timestamp. Directory traversal happens in the
//! bundle factory; nothing here walks the file system.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::asset::path;
use crate::error::{Result, fs};

pub trait SourceFile: Send + Sync + fmt::Debug {
    /// Application-relative path, e.g. `~/scripts/app.js`
    fn full_path(&self) -> &str;

    /// Open a fresh stream over the file's bytes
    fn open_read(&self) -> Result<Box<dyn Read + Send + '_>>;

    fn last_write_time(&self) -> Result<SystemTime>;

    fn exists(&self) -> bool;

    /// Directory containing the file, application relative
    fn directory(&self) -> &str {
        path::directory_of(self.full_path())
    }
}

/// A file on disk below an application root
#[derive(Debug, Clone)]
pub struct DiskFile {
    app_path: String,
    disk_path: PathBuf,
}

impl DiskFile {
    /// Map an application-relative path (`~/...`) below `root`.
    ///
    /// # Errors
    ///
    /// Fails with `PathOutsideRoot` when the normalized path still climbs
    /// above the root through `..` segments.
    pub fn new(root: &Path, app_path: &str) -> Result<Self> {
        let app_path = path::app_relative(app_path);
        let relative = app_path.trim_start_matches('~').trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return Err(fs::outside_root(app_path));
        }
        Ok(Self {
            disk_path: root.join(relative),
            app_path,
        })
    }

    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }
}

impl SourceFile for DiskFile {
    fn full_path(&self) -> &str {
        &self.app_path
    }

    fn open_read(&self) -> Result<Box<dyn Read + Send + '_>> {
        let file = File::open(&self.disk_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => fs::not_found(self.disk_path.display().to_string()),
            _ => fs::read_failed(self.disk_path.display().to_string(), e.to_string()),
        })?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn last_write_time(&self) -> Result<SystemTime> {
        std::fs::metadata(&self.disk_path)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| fs::read_failed(self.disk_path.display().to_string(), e.to_string()))
    }

    fn exists(&self) -> bool {
        self.disk_path.is_file()
    }
}

/// An in-memory file, used for generated sources and in tests
#[derive(Debug, Clone)]
pub struct MemoryFile {
    app_path: String,
    content: Vec<u8>,
    modified: SystemTime,
}

impl MemoryFile {
    pub fn new(app_path: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            app_path: path::app_relative(app_path),
            content: content.into(),
            modified: SystemTime::now(),
        }
    }
}

impl SourceFile for MemoryFile {
    fn full_path(&self) -> &str {
        &self.app_path
    }

    fn open_read(&self) -> Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.content.as_slice())))
    }

    fn last_write_time(&self) -> Result<SystemTime> {
        Ok(self.modified)
    }

    fn exists(&self) -> bool {
        true
    }
}
