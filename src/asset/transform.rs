//! Asset transformation chain
//!
//! Transformers turn an asset's bytes into other bytes (minification,
//! compilation, wrapping). They run lazily on every content read, in the order
//! they were registered, and never affect the asset's hash.

use std::path::Path;

use crate::asset::path;
use crate::error::Result;

pub trait AssetTransformer: Send + Sync {
    /// Transform `content` read from the asset at `asset_path`
    fn transform(&self, content: Vec<u8>, asset_path: &str) -> Result<Vec<u8>>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "transformer"
    }
}

impl<F> AssetTransformer for F
where
    F: Fn(Vec<u8>, &str) -> Result<Vec<u8>> + Send + Sync,
{
    fn transform(&self, content: Vec<u8>, asset_path: &str) -> Result<Vec<u8>> {
        self(content, asset_path)
    }
}

/// Wraps an HTML template so that loading it registers it with a JavaScript
/// template dictionary: `JST['scripts-item'] = "<markup>";`
#[derive(Debug, Clone)]
pub struct RegisterTemplate {
    bundle_path: String,
    variable: String,
}

impl RegisterTemplate {
    pub fn new(bundle_path: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            bundle_path: bundle_path.into(),
            variable: variable.into(),
        }
    }

    /// Template id: the asset path relative to the bundle, without extension,
    /// with `/` replaced by `-`
    pub fn template_id(&self, asset_path: &str) -> String {
        let bundle_prefix = format!("{}/", self.bundle_path.trim_end_matches('/'));
        let relative = match asset_path.get(..bundle_prefix.len()) {
            Some(head) if head.eq_ignore_ascii_case(&bundle_prefix) => {
                &asset_path[bundle_prefix.len()..]
            }
            _ => asset_path.trim_start_matches('~').trim_start_matches('/'),
        };

        let without_extension = match Path::new(relative).extension() {
            Some(extension) => &relative[..relative.len() - extension.len() - 1],
            None => relative,
        };
        path::to_forward_slashes(without_extension).replace('/', "-")
    }
}

impl AssetTransformer for RegisterTemplate {
    fn transform(&self, content: Vec<u8>, asset_path: &str) -> Result<Vec<u8>> {
        let id = self.template_id(asset_path);
        let markup = String::from_utf8_lossy(&content);
        let variable = &self.variable;
        let script = format!(
            "var {variable} = {variable} || {{}};\n{variable}[{}] = {};\n",
            javascript_string(&id, '\''),
            javascript_string(&markup, '"')
        );
        Ok(script.into_bytes())
    }

    fn name(&self) -> &str {
        "register_template"
    }
}

/// Quote `text` as a JavaScript string literal delimited by `quote`
fn javascript_string(text: &str, quote: char) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(quote);
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            c if c == quote => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            // keeps "</script>" inside the string from closing an inline tag
            '<' => quoted.push_str("\\u003c"),
            _ => quoted.push(c),
        }
    }
    quoted.push(quote);
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_id_relative_to_bundle() {
        let register = RegisterTemplate::new("~/templates", "JST");
        assert_eq!(register.template_id("~/templates/item.htm"), "item");
        assert_eq!(register.template_id("~/templates/list/row.html"), "list-row");
        assert_eq!(register.template_id("~/Templates/Item.htm"), "Item");
    }

    #[test]
    fn test_template_id_outside_bundle_uses_app_path() {
        let register = RegisterTemplate::new("~/templates", "JST");
        assert_eq!(register.template_id("~/shared/x.htm"), "shared-x");
    }

    #[test]
    fn test_register_template_wraps_markup() {
        let register = RegisterTemplate::new("~/templates", "JST");
        let output = register
            .transform(b"<p class=\"a\">\n{{name}}</p>".to_vec(), "~/templates/item.htm")
            .unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "var JST = JST || {};\nJST['item'] = \"\\u003cp class=\\\"a\\\">\\n{{name}}\\u003c/p>\";\n"
        );
    }

    #[test]
    fn test_register_template_escapes_id() {
        let register = RegisterTemplate::new("~/templates", "JST");
        let output = register
            .transform(b"x".to_vec(), "~/templates/it's.htm")
            .unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "var JST = JST || {};\nJST['it\\'s'] = \"x\";\n"
        );
        assert_eq!(javascript_string("a\\'b\"", '\''), "'a\\\\\\'b\"'");
    }

    #[test]
    fn test_closure_transformer() {
        let upper = |content: Vec<u8>, _: &str| -> Result<Vec<u8>> {
            Ok(content.to_ascii_uppercase())
        };
        assert_eq!(upper.transform(b"abc".to_vec(), "~/a.js").unwrap(), b"ABC");
        assert_eq!(upper.name(), "transformer");
    }
}
