//! Configuration file handling for Satchel
//!
//! `satchel.yaml` holds global [`Settings`] and the list of bundle definitions:
//!
//! ```yaml
//! settings:
//!   route_prefix: _satchel
//! bundles:
//!   - path: scripts/app
//!     kind: script
//!     files: ["**/*.js"]
//!     references: ["~/scripts/lib"]
//! ```

pub mod bundle;
pub mod settings;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SatchelError, config as config_error};

pub use bundle::BundleDefinition;
pub use settings::Settings;

/// Default configuration file name
pub const CONFIG_FILE: &str = "satchel.yaml";

/// Parsed `satchel.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatchelConfig {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub bundles: Vec<BundleDefinition>,
}

impl SatchelConfig {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => config_error::not_found(path.display().to_string()),
            _ => config_error::parse_failed(path.display().to_string(), e.to_string()),
        })?;

        Self::from_yaml(&yaml).map_err(|e| match e {
            SatchelError::ConfigParseFailed { reason, .. } => {
                config_error::parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        for bundle in &mut config.bundles {
            bundle.normalize();
        }
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        let mut seen = HashSet::new();
        for bundle in &self.bundles {
            bundle.validate()?;
            if !seen.insert(bundle.path.to_lowercase()) {
                return Err(config_error::invalid(format!(
                    "Bundle path '{}' is declared more than once",
                    bundle.path
                )));
            }
        }

        Ok(())
    }
}
