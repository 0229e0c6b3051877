//! Manifests: persistable snapshots of resolved bundles
//!
//! A manifest carries everything another process needs to render and serve a
//! bundle without re-reading its sources: paths, hashes, rendered HTML, the
//! references that cross bundle boundaries, and optionally the content.
//! `SameBundle` references are never stored; co-membership already implies
//! them.

pub mod builder;
pub mod serialization;
pub mod stand_in;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::asset::AssetReferenceType;
use crate::bundle::BundleKind;

pub use builder::{BundleManifestBuilder, build_asset_manifest};
pub use serialization::{BuildManifest, MANIFEST_FILE, MANIFEST_VERSION};
pub use stand_in::ManifestAsset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReferenceManifest {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: AssetReferenceType,
    pub source_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLocalizedStringManifest {
    pub localized_string: String,
    pub source_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAbConfigManifest {
    pub ab_config: String,
    pub source_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<AssetReferenceManifest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub localized_strings: Vec<AssetLocalizedStringManifest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ab_configs: Vec<AssetAbConfigManifest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub path: String,
    pub kind: BundleKind,
    #[serde(
        serialize_with = "serialization::serialize_hex",
        deserialize_with = "serialization::deserialize_hex"
    )]
    pub hash: Vec<u8>,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_location: Option<String>,
    /// Bundle bytes, present only when the build asked for content
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialization::serialize_optional_hex",
        deserialize_with = "serialization::deserialize_optional_hex"
    )]
    pub content: Option<Vec<u8>>,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_condition: Option<String>,
    /// Declared bundle-level references
    #[serde(default)]
    pub references: Vec<String>,
    /// Localization keys of the bundle and all its assets
    #[serde(default)]
    pub localized_strings: Vec<String>,
    /// A/B flags of the bundle and all its assets
    #[serde(default)]
    pub ab_configs: Vec<String>,
    #[serde(default)]
    pub html_attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub assets: Vec<AssetManifest>,
}
