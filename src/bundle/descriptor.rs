//! Declarative bundle contents
//!
//! A descriptor lists which files make up a bundle plus the references,
//! localization keys and A/B flags declared for it. It is only used while a
//! bundle is built.

use serde::{Deserialize, Serialize};
use wax::Glob;

use super::{Bundle, BundleKind, ExternalSource};
use crate::error::{Result, bundle as bundle_error, config as config_error};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleDescriptor {
    /// Glob patterns relative to the bundle directory, or `~/` file paths
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub localized_strings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ab_configs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_condition: Option<String>,
}

impl BundleDescriptor {
    /// File patterns to match, falling back to the kind's defaults
    pub fn patterns(&self, kind: BundleKind) -> Vec<&str> {
        if self.files.is_empty() {
            kind.default_patterns().to_vec()
        } else {
            self.files.iter().map(String::as_str).collect()
        }
    }

    pub fn validate(&self, bundle_path: &str) -> Result<()> {
        if self.fallback_condition.is_some() && self.external_url.is_none() {
            return Err(config_error::invalid(format!(
                "Bundle '{bundle_path}' has a fallback_condition but no external_url"
            )));
        }

        for pattern in self.files.iter().filter(|p| !is_explicit_file(p)) {
            Glob::new(pattern).map_err(|e| bundle_error::invalid_glob(pattern, e.to_string()))?;
        }

        Ok(())
    }

    /// Copy declared references, keys, flags and external source onto `bundle`
    pub fn apply_to(&self, bundle: &mut Bundle) {
        for reference in &self.references {
            bundle.add_reference(reference);
        }
        for name in &self.localized_strings {
            bundle.add_localized_string(name);
        }
        for name in &self.ab_configs {
            bundle.add_ab_config(name);
        }
        bundle.set_external(self.external_url.as_ref().map(|url| ExternalSource {
            url: url.clone(),
            fallback_condition: self.fallback_condition.clone(),
        }));
    }
}

/// `~/` entries name a single application file instead of a pattern
pub(crate) fn is_explicit_file(pattern: &str) -> bool {
    pattern.starts_with('~')
}
