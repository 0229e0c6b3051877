//! HTML tags for bundles
//!
//! Script and template bundles render a `<script>` tag, stylesheets a
//! `<link>` tag. Bundles served from an external URL point at that URL and,
//! given a fallback condition, write the local tag when the condition holds.

use std::collections::BTreeMap;

use super::{Bundle, BundleKind};
use crate::error::Result;
use crate::url::UrlGenerator;

pub fn render(bundle: &Bundle, urls: &UrlGenerator) -> Result<String> {
    let attributes = attributes(bundle.html_attributes());

    let Some(external) = bundle.external() else {
        return Ok(tag(bundle.kind(), &urls.bundle_url(bundle)?, &attributes));
    };

    let external_tag = tag(bundle.kind(), &external.url, &attributes);
    let Some(condition) = &external.fallback_condition else {
        return Ok(external_tag);
    };

    let local_tag = tag(bundle.kind(), &urls.bundle_url(bundle)?, &attributes);
    Ok(format!(
        "{external_tag}\n<script type=\"text/javascript\">\nif({condition}){{\ndocument.write(unescape('{}'));\n}}\n</script>",
        escape_for_document_write(&local_tag)
    ))
}

fn tag(kind: BundleKind, url: &str, attributes: &str) -> String {
    let url = escape_attribute(url);
    match kind {
        BundleKind::Script | BundleKind::HtmlTemplate => {
            format!("<script src=\"{url}\" type=\"text/javascript\"{attributes}></script>")
        }
        BundleKind::Stylesheet => {
            format!("<link href=\"{url}\" type=\"text/css\" rel=\"stylesheet\"{attributes}/>")
        }
    }
}

/// ` name="value"` pairs in name order; an empty value renders the bare name
fn attributes(html_attributes: &BTreeMap<String, String>) -> String {
    html_attributes
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                format!(" {name}")
            } else {
                format!(" {name}=\"{}\"", escape_attribute(value))
            }
        })
        .collect()
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Encode the tag so it survives inside a single-quoted `unescape('...')`
fn escape_for_document_write(tag: &str) -> String {
    tag.replace('<', "%3C")
        .replace('>', "%3E")
        .replace('\'', "%27")
}
