//! JSON persistence for build manifests (satchel-manifest.json)

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bundle::Bundle;
use crate::error::{Result, fs as fs_error, manifest as manifest_error};

use super::BundleManifest;

/// Manifest file name written next to the configuration
pub const MANIFEST_FILE: &str = "satchel-manifest.json";

/// Current manifest format version
pub const MANIFEST_VERSION: u32 = 1;

/// Serialize bytes as a lowercase hex string
pub fn serialize_hex<S>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

pub fn deserialize_hex<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    hex::decode(&text).map_err(serde::de::Error::custom)
}

#[allow(clippy::ref_option)]
pub fn serialize_optional_hex<S>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match bytes {
        Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize_optional_hex<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|text| hex::decode(&text).map_err(serde::de::Error::custom))
        .transpose()
}

/// Every bundle of one build, in dependency order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub version: u32,
    #[serde(default)]
    pub bundles: Vec<BundleManifest>,
}

impl BuildManifest {
    pub fn new(bundles: Vec<BundleManifest>) -> Self {
        Self {
            version: MANIFEST_VERSION,
            bundles,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse manifest JSON; `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Malformed JSON and unknown format versions are rejected.
    pub fn from_json(json: &str, origin: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| manifest_error::parse_failed(origin, e.to_string()))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(manifest_error::parse_failed(
                origin,
                format!(
                    "unsupported manifest version {} (expected {MANIFEST_VERSION})",
                    manifest.version
                ),
            ));
        }
        Ok(manifest)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                fs_error::not_found(&display)
            } else {
                fs_error::read_failed(&display, e.to_string())
            }
        })?;
        Self::from_json(&json, &display)
    }

    /// Write the manifest through a temporary file in the same directory so
    /// readers never observe a partial file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let display = path.display().to_string();
        let json = self.to_json()?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(&display, e.to_string()))?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| fs_error::write_failed(&display, e.to_string()))?;
        temp.write_all(json.as_bytes())
            .and_then(|()| temp.write_all(b"\n"))
            .map_err(|e| fs_error::write_failed(&display, e.to_string()))?;
        temp.persist(path)
            .map_err(|e| fs_error::write_failed(&display, e.error.to_string()))?;

        let manifest_path = &display;
        tracing::debug!(path = %manifest_path, bundles = self.bundles.len(), "wrote manifest");
        Ok(())
    }

    /// Read-only bundles for rendering without the sources
    pub fn to_bundles(&self) -> Vec<Bundle> {
        self.bundles.iter().map(Bundle::from_manifest).collect()
    }

    pub fn find(&self, path: &str) -> Option<&BundleManifest> {
        self.bundles
            .iter()
            .find(|b| crate::asset::path::same_path(&b.path, path))
    }
}
