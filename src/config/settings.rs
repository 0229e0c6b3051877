//! Global settings

use serde::{Deserialize, Serialize};

use crate::error::{Result, config as config_error};
use crate::url::DEFAULT_ROUTE_PREFIX;

pub const DEFAULT_TEMPLATE_VARIABLE: &str = "JST";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// First segment of every generated URL
    pub route_prefix: String,

    /// JavaScript object html templates register themselves on
    pub template_variable: String,

    /// Store bundle content in the manifest
    pub include_content: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            template_variable: DEFAULT_TEMPLATE_VARIABLE.to_string(),
            include_content: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.route_prefix.trim().is_empty() {
            return Err(config_error::invalid("route_prefix must not be empty"));
        }

        if !is_identifier(&self.template_variable) {
            return Err(config_error::invalid(format!(
                "template_variable '{}' is not a JavaScript identifier",
                self.template_variable
            )));
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = |c: char| c == '_' || c == '$' || c.is_ascii_alphabetic();
    chars.next().is_some_and(valid_start) && chars.all(|c| valid_start(c) || c.is_ascii_digit())
}
