//! Bundle definitions in satchel.yaml

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::asset::path;
use crate::bundle::{BundleDescriptor, BundleKind};
use crate::error::{Result, config as config_error};

/// One entry of the `bundles` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDefinition {
    /// Bundle directory (or single file), made application relative on load
    pub path: String,

    pub kind: BundleKind,

    #[serde(flatten)]
    pub descriptor: BundleDescriptor,

    /// Where on a page the bundle renders, e.g. `head`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_location: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub html_attributes: BTreeMap<String, String>,
}

impl BundleDefinition {
    pub fn new(path: &str, kind: BundleKind) -> Self {
        Self {
            path: path::app_relative(path),
            kind,
            descriptor: BundleDescriptor::default(),
            page_location: None,
            html_attributes: BTreeMap::new(),
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.path = path::app_relative(&self.path);
    }

    pub fn validate(&self) -> Result<()> {
        if self.path == "~" || self.path.is_empty() {
            return Err(config_error::invalid("Bundle path must name a directory or file"));
        }
        self.descriptor.validate(&self.path)
    }
}
